//! [`Command`] for creating a new [`Hotel`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::hotel::{Amenity, City, Country, Description, Name};
use crate::{
    domain::{hotel, Hotel},
    infra::{database, Database},
    policy::{self, Caller},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Hotel`].
#[derive(Clone, Debug)]
pub struct CreateHotel {
    /// [`Caller`] creating the [`Hotel`] and becoming its owner.
    pub caller: Caller,

    /// [`Name`] of a new [`Hotel`].
    pub name: hotel::Name,

    /// [`Description`] of a new [`Hotel`], if any.
    pub description: Option<hotel::Description>,

    /// [`City`] of a new [`Hotel`].
    pub city: hotel::City,

    /// [`Country`] of a new [`Hotel`].
    pub country: hotel::Country,

    /// [`Amenity`] labels of a new [`Hotel`].
    pub amenities: Vec<hotel::Amenity>,
}

impl<Db> Command<CreateHotel> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Hotel>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Hotel;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateHotel) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateHotel {
            caller,
            name,
            description,
            city,
            country,
            amenities,
        } = cmd;

        policy::create_hotel(caller)
            .ok()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let hotel = Hotel {
            id: hotel::Id::new(),
            owner_id: caller.id,
            name,
            description,
            city,
            country,
            amenities,
            rating: hotel::Rating::NONE,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(hotel.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(hotel)
    }
}

/// Error of [`CreateHotel`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not allowed to create [`Hotel`]s.
    #[display("Forbidden: {_0}")]
    Forbidden(policy::Reason),
}
