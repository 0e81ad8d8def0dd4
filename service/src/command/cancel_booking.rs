//! [`Command`] for cancelling a [`Booking`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking::{self, NotCancellable},
        Booking,
    },
    infra::{database, Database},
    policy::{self, Caller},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// [`Caller`] cancelling the [`Booking`].
    pub caller: Caller,

    /// ID of the [`Booking`] to be cancelled.
    pub booking_id: booking::Id,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Update<booking::Transition>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking { caller, booking_id } = cmd;

        let mut booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        policy::manage_booking(caller, booking.user_id)
            .ok()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let now = DateTime::now();
        booking
            .check_cancellable(now)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let cancelled_at = now.coerce();
        let cancelled = self
            .database()
            .execute(Update(booking::Transition {
                id: booking.id,
                expected: booking::Status::Confirmed,
                status: booking::Status::Cancelled,
                cancelled_at: Some(cancelled_at),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !cancelled {
            return Err(tracerr::new!(E::Conflict(booking.id)));
        }

        booking.status = booking::Status::Cancelled;
        booking.cancelled_at = Some(cancelled_at);

        log::info!(booking_id = %booking.id, "booking cancelled");

        Ok(booking)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] was changed concurrently and is not cancellable anymore.
    #[display("`Booking(id: {_0})` was changed concurrently")]
    #[from(ignore)]
    Conflict(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not allowed to cancel the [`Booking`].
    #[display("Forbidden: {_0}")]
    Forbidden(policy::Reason),

    /// [`Booking`] may not be cancelled.
    #[display("`Booking` is not cancellable: {_0}")]
    NotCancellable(NotCancellable),
}
