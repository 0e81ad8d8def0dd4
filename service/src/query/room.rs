//! [`Query`] collection related to a single [`Room`].

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{booking, room, Booking},
    infra::{database, Database},
    Query, Service,
};
#[cfg(doc)]
use crate::domain::Room;

/// [`Query`] checking whether a [`Room`] is free for a [`booking::Period`].
///
/// Only non-cancelled [`Booking`]s occupy a [`Room`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IsAvailable {
    /// ID of the [`Room`] to check.
    pub room_id: room::Id,

    /// [`booking::Period`] to check the [`Room`] for.
    pub period: booking::Period,
}

impl<Db> Query<IsAvailable> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Booking>, room::Id>>,
        Ok = Vec<Booking>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        IsAvailable { room_id, period }: IsAvailable,
    ) -> Result<Self::Ok, Self::Err> {
        is_available(self.database(), room_id, &period)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Checks whether no [`Booking`] stored in the provided [`Database`] blocks
/// the [`Room`] for the provided [`booking::Period`].
pub(crate) async fn is_available<Db>(
    db: &Db,
    room_id: room::Id,
    period: &booking::Period,
) -> Result<bool, Traced<database::Error>>
where
    Db: Database<
        Select<By<Vec<Booking>, room::Id>>,
        Ok = Vec<Booking>,
        Err = Traced<database::Error>,
    >,
{
    let bookings = db
        .execute(Select(By::<Vec<Booking>, _>::new(room_id)))
        .await
        .map_err(tracerr::wrap!())?;
    Ok(!bookings.iter().any(|b| b.blocks(period)))
}
