//! [`Command`] for booking a [`Room`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, room, Booking, Room},
    infra::{database, database::constraint, Database},
    policy::{self, Caller},
    query, Service,
};

use super::Command;

/// [`Command`] for booking a [`Room`].
#[derive(Clone, Copy, Debug)]
pub struct CreateBooking {
    /// [`Caller`] making the [`Booking`].
    pub caller: Caller,

    /// ID of the [`Room`] to book.
    pub room_id: room::Id,

    /// Check-in [`Date`].
    pub check_in: Date,

    /// Check-out [`Date`].
    pub check_out: Date,

    /// Number of [`booking::Guests`] staying.
    pub guests: booking::Guests,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Room>, room::Id>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Booking>, room::Id>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Vec<Booking>, room::Id>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Room, room::Id>>, Err = Traced<database::Error>>
        + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            caller,
            room_id,
            check_in,
            check_out,
            guests,
        } = cmd;

        policy::book(caller)
            .ok()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let room = self
            .database()
            .execute(Select(By::<Option<Room>, _>::new(room_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RoomNotExists(room_id))
            .map_err(tracerr::wrap!())?;

        if !guests.fit(room.max_occupancy) {
            return Err(tracerr::new!(E::CapacityExceeded {
                guests,
                max: room.max_occupancy,
            }));
        }

        let period = booking::Period::new(check_in, check_out);
        if let Ok(period) = &period {
            if !query::room::is_available(self.database(), room.id, period)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
            {
                return Err(tracerr::new!(E::RoomNotAvailable(room.id)));
            }
        }

        if check_in < Date::today() {
            return Err(tracerr::new!(E::CheckInInPast(check_in)));
        }
        let period = period.map_err(tracerr::from_and_wrap!(=> E))?;

        let total_price = period
            .price(room.price)
            .ok_or(E::PriceOverflow(period))
            .map_err(tracerr::wrap!())?;

        let booking = Booking {
            id: booking::Id::new(),
            user_id: caller.id,
            room_id: room.id,
            hotel_id: room.hotel_id,
            period,
            guests,
            total_price,
            status: booking::Status::Confirmed,
            created_at: DateTime::now().coerce(),
            cancelled_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same `Room`.
        tx.execute(Lock(By::<Room, _>::new(room.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if !query::room::is_available(&tx, room.id, &period)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        {
            return Err(tracerr::new!(E::RoomNotAvailable(room.id)));
        }

        tx.execute(Insert(booking.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_constraint_violation(constraint::BOOKING_PERIOD)
                {
                    tracerr::new!(E::RoomNotAvailable(room.id))
                } else {
                    (tracerr::map_from_and_wrap!(=> E))(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            booking_id = %booking.id,
            room_id = %booking.room_id,
            nights = booking.period.nights(),
            "booking confirmed",
        );

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`booking::Guests`] exceed the [`room::Occupancy`] of the [`Room`].
    #[display("{guests} guests exceed {max} maximum occupancy")]
    #[from(ignore)]
    CapacityExceeded {
        /// Requested [`booking::Guests`].
        guests: booking::Guests,

        /// Maximum [`room::Occupancy`] of the [`Room`].
        max: room::Occupancy,
    },

    /// Check-in [`Date`] is in the past.
    #[display("`{_0}` check-in date is in the past")]
    #[from(ignore)]
    CheckInInPast(#[error(not(source))] Date),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not allowed to book [`Room`]s.
    #[display("Forbidden: {_0}")]
    Forbidden(policy::Reason),

    /// Check-out [`Date`] is not after the check-in one.
    #[display("Invalid dates: {_0}")]
    InvalidPeriod(booking::InvalidRange),

    /// Total price of the [`booking::Period`] doesn't fit into the amount.
    #[display("Total price of `{_0:?}` overflows")]
    #[from(ignore)]
    PriceOverflow(#[error(not(source))] booking::Period),

    /// [`Room`] is already booked for an overlapping [`booking::Period`].
    #[display("`Room(id: {_0})` is not available")]
    #[from(ignore)]
    RoomNotAvailable(#[error(not(source))] room::Id),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    #[from(ignore)]
    RoomNotExists(#[error(not(source))] room::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{Insert, Update},
        Date, Money,
    };

    use crate::{
        command::Command as _,
        domain::{booking, room, user::Role, Room},
        infra::database::Memory,
        policy::Caller,
        query::room::IsAvailable,
        test_util, Service,
    };

    use super::{CreateBooking, ExecutionError};

    async fn setup() -> (Service<Memory>, Room) {
        let svc = test_util::service();
        let owner = test_util::caller(Role::Owner);
        let hotel = test_util::hotel(&owner);
        let room = test_util::room(&hotel, "101", 100);
        svc.database().execute(Insert(hotel)).await.unwrap();
        svc.database().execute(Insert(room.clone())).await.unwrap();
        (svc, room)
    }

    fn cmd(caller: Caller, room: &Room, from: i64, to: i64) -> CreateBooking {
        CreateBooking {
            caller,
            room_id: room.id,
            check_in: test_util::day(from),
            check_out: test_util::day(to),
            guests: booking::Guests::new(2).unwrap(),
        }
    }

    #[tokio::test]
    async fn books_available_room() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);

        let booking = svc.execute(cmd(guest, &room, 10, 13)).await.unwrap();

        assert_eq!(booking.user_id, guest.id);
        assert_eq!(booking.hotel_id, room.hotel_id);
        assert_eq!(booking.status, booking::Status::Confirmed);
        assert_eq!(booking.total_price, Money::new(300.into()).unwrap());
        assert_eq!(svc.database().bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn same_day_check_in_is_allowed() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);

        let booking = svc.execute(cmd(guest, &room, 0, 1)).await.unwrap();

        assert_eq!(booking.period.check_in(), Date::today());
    }

    #[tokio::test]
    async fn no_double_booking() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);
        _ = svc.execute(cmd(guest, &room, 10, 14)).await.unwrap();

        let err = svc.execute(cmd(guest, &room, 12, 16)).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::RoomNotAvailable(_)));

        let adjacent = svc.execute(cmd(guest, &room, 14, 17)).await;
        assert!(adjacent.is_ok(), "{adjacent:?}");
    }

    #[tokio::test]
    async fn cancelled_bookings_free_room() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);
        let first = svc.execute(cmd(guest, &room, 10, 14)).await.unwrap();
        let cancelled = svc
            .database()
            .execute(Update(booking::Transition {
                id: first.id,
                expected: booking::Status::Confirmed,
                status: booking::Status::Cancelled,
                cancelled_at: None,
            }))
            .await
            .unwrap();
        assert!(cancelled);

        let rebooked = svc.execute(cmd(guest, &room, 11, 13)).await;

        assert!(rebooked.is_ok(), "{rebooked:?}");
    }

    #[tokio::test]
    async fn agrees_with_availability_query() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);
        let is_free = |from, to| {
            svc.execute(IsAvailable {
                room_id: room.id,
                period: booking::Period::new(
                    test_util::day(from),
                    test_util::day(to),
                )
                .unwrap(),
            })
        };
        assert!(is_free(10, 14).await.unwrap());

        _ = svc.execute(cmd(guest, &room, 10, 14)).await.unwrap();

        assert!(!is_free(12, 16).await.unwrap());
        let err = svc.execute(cmd(guest, &room, 12, 16)).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::RoomNotAvailable(_)));

        assert!(is_free(14, 17).await.unwrap());
        let adjacent = svc.execute(cmd(guest, &room, 14, 17)).await;
        assert!(adjacent.is_ok(), "{adjacent:?}");
    }

    #[tokio::test]
    async fn concurrent_overlap_is_rejected_by_storage() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);
        _ = svc.execute(cmd(guest, &room, 10, 14)).await.unwrap();

        let err = test_util::stale(&svc)
            .execute(cmd(guest, &room, 12, 16))
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::RoomNotAvailable(_)));
        assert_eq!(svc.database().bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn validates_request() {
        let (svc, room) = setup().await;
        let guest = test_util::caller(Role::Customer);

        let err = svc.execute(cmd(guest, &room, -1, 2)).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::CheckInInPast(_)));

        let err = svc.execute(cmd(guest, &room, 5, 5)).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::InvalidPeriod(_)));

        let err = svc
            .execute(CreateBooking {
                guests: booking::Guests::new(3).unwrap(),
                ..cmd(guest, &room, 5, 6)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::CapacityExceeded { .. },
        ));

        let err = svc
            .execute(CreateBooking {
                room_id: room::Id::new(),
                ..cmd(guest, &room, 5, 6)
            })
            .await
            .unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::RoomNotExists(_)));

        assert!(svc.database().bookings().await.is_empty());
    }

    #[tokio::test]
    async fn owners_cannot_book() {
        let (svc, room) = setup().await;

        let err = svc
            .execute(cmd(test_util::caller(Role::Owner), &room, 10, 12))
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::Forbidden(_)));
    }
}
