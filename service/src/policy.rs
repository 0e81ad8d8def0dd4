//! Access policy of the [`Service`] operations.
//!
//! Every check is a pure function of the [`Caller`] and the owner of the
//! accessed resource, so it may be evaluated before any mutation happens.
//!
//! [`Service`]: crate::Service

use derive_more::{Display, Error};

use crate::domain::user::{self, Role, Session};
#[cfg(doc)]
use crate::domain::{Booking, Hotel, Room, User};

/// Authenticated [`User`] performing an operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Caller {
    /// ID of the calling [`User`].
    pub id: user::Id,

    /// [`Role`] of the calling [`User`].
    pub role: Role,
}

impl From<Session> for Caller {
    fn from(session: Session) -> Self {
        Self {
            id: session.user_id,
            role: session.role,
        }
    }
}

/// Outcome of an access check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Access is granted.
    Allowed,

    /// Access is denied for the [`Reason`].
    Forbidden(Reason),
}

impl Decision {
    /// Converts this [`Decision`] into a [`Result`].
    ///
    /// # Errors
    ///
    /// With the [`Reason`] if access is [`Decision::Forbidden`].
    pub const fn ok(self) -> Result<(), Reason> {
        match self {
            Self::Allowed => Ok(()),
            Self::Forbidden(reason) => Err(reason),
        }
    }
}

/// Reason of an access denial.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum Reason {
    /// [`Caller`] has a [`Role`] not allowed to perform the operation.
    #[display("`{_0}` role is required")]
    RoleRequired(#[error(not(source))] Role),

    /// [`Caller`] doesn't own the accessed resource.
    #[display("resource is owned by another `User`")]
    NotOwner,
}

/// Requires the [`Caller`] to have the provided [`Role`].
///
/// Every other check of this module implies this one, so it may be used to
/// reject a [`Caller`] before the accessed resource is even looked up.
#[must_use]
pub const fn require(caller: Caller, role: Role) -> Decision {
    if caller.role.u8() == role.u8() {
        Decision::Allowed
    } else {
        Decision::Forbidden(Reason::RoleRequired(role))
    }
}

/// Requires the [`Caller`] to have the provided [`Role`] and to be the
/// `owner`.
fn require_owner(caller: Caller, role: Role, owner: user::Id) -> Decision {
    match require(caller, role) {
        Decision::Allowed if caller.id == owner => Decision::Allowed,
        Decision::Allowed => Decision::Forbidden(Reason::NotOwner),
        forbidden @ Decision::Forbidden(_) => forbidden,
    }
}

/// Checks whether the [`Caller`] may create a new [`Hotel`].
#[must_use]
pub const fn create_hotel(caller: Caller) -> Decision {
    require(caller, Role::Owner)
}

/// Checks whether the [`Caller`] may add a [`Room`] to the [`Hotel`] owned by
/// the `hotel_owner`.
#[must_use]
pub fn add_room(caller: Caller, hotel_owner: user::Id) -> Decision {
    require_owner(caller, Role::Owner, hotel_owner)
}

/// Checks whether the [`Caller`] may book a [`Room`].
#[must_use]
pub const fn book(caller: Caller) -> Decision {
    require(caller, Role::Customer)
}

/// Checks whether the [`Caller`] may list their [`Booking`]s.
#[must_use]
pub const fn list_bookings(caller: Caller) -> Decision {
    require(caller, Role::Customer)
}

/// Checks whether the [`Caller`] may cancel or review the [`Booking`] made by
/// the `booking_owner`.
#[must_use]
pub fn manage_booking(caller: Caller, booking_owner: user::Id) -> Decision {
    require_owner(caller, Role::Customer, booking_owner)
}

#[cfg(test)]
mod spec {
    use crate::domain::user::{self, Role};

    use super::{
        add_room, book, create_hotel, manage_booking, Caller, Decision, Reason,
    };

    fn caller(role: Role) -> Caller {
        Caller {
            id: user::Id::new(),
            role,
        }
    }

    #[test]
    fn only_owners_create_hotels() {
        assert_eq!(create_hotel(caller(Role::Owner)), Decision::Allowed);
        assert_eq!(
            create_hotel(caller(Role::Customer)),
            Decision::Forbidden(Reason::RoleRequired(Role::Owner)),
        );
    }

    #[test]
    fn hotel_owner_adds_rooms() {
        let owner = caller(Role::Owner);

        assert_eq!(add_room(owner, owner.id), Decision::Allowed);
    }

    #[test]
    fn other_owner_cannot_add_rooms() {
        let owner = caller(Role::Owner);
        let stranger = caller(Role::Owner);

        assert_eq!(
            add_room(stranger, owner.id),
            Decision::Forbidden(Reason::NotOwner),
        );
    }

    #[test]
    fn customer_cannot_add_rooms_even_by_id() {
        let customer = caller(Role::Customer);

        assert_eq!(
            add_room(customer, customer.id).ok(),
            Err(Reason::RoleRequired(Role::Owner)),
        );
    }

    #[test]
    fn only_customers_book() {
        assert_eq!(book(caller(Role::Customer)).ok(), Ok(()));
        assert!(book(caller(Role::Owner)).ok().is_err());
    }

    #[test]
    fn bookings_are_managed_by_their_makers() {
        let maker = caller(Role::Customer);
        let other = caller(Role::Customer);

        assert_eq!(manage_booking(maker, maker.id), Decision::Allowed);
        assert_eq!(
            manage_booking(other, maker.id),
            Decision::Forbidden(Reason::NotOwner),
        );
        assert_eq!(
            manage_booking(Caller { role: Role::Owner, ..maker }, maker.id),
            Decision::Forbidden(Reason::RoleRequired(Role::Customer)),
        );
    }
}
