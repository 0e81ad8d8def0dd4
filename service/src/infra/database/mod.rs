//! [`Database`]-related implementations.

#[cfg(test)]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(test)]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Names of the storage constraints the [`Service`] relies on.
///
/// [`Service`]: crate::Service
pub mod constraint {
    /// Uniqueness of a [`User`] email.
    ///
    /// [`User`]: crate::domain::User
    pub const USER_EMAIL: &str = "users_email_unique";

    /// Uniqueness of a [`Room`] number within its [`Hotel`].
    ///
    /// [`Hotel`]: crate::domain::Hotel
    /// [`Room`]: crate::domain::Room
    pub const ROOM_NUMBER: &str = "rooms_hotel_id_number_unique";

    /// Absence of overlapping confirmed [`Booking`]s of the same [`Room`].
    ///
    /// [`Booking`]: crate::domain::Booking
    /// [`Room`]: crate::domain::Room
    pub const BOOKING_PERIOD: &str = "bookings_room_id_period_excl";

    /// Uniqueness of a [`Review`] per [`User`] and [`Booking`].
    ///
    /// [`Booking`]: crate::domain::Booking
    /// [`Review`]: crate::domain::Review
    /// [`User`]: crate::domain::User
    pub const REVIEW_BOOKING: &str = "reviews_user_id_booking_id_unique";
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(test)]
    /// [`Memory`] error.
    Memory(memory::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the [`constraint`]
    /// with the provided name.
    #[must_use]
    pub fn is_constraint_violation(&self, constraint: &str) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_constraint_violation(Some(constraint)),
            #[cfg(test)]
            Self::Memory(e) => e.is_constraint_violation(constraint),
        }
    }
}
