//! [`Command`] for adding a new [`Room`] to a [`Hotel`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{hotel, room, Hotel, Room},
    infra::{database, database::constraint, Database},
    policy::{self, Caller},
    Service,
};

use super::Command;

/// [`Command`] for adding a new [`Room`] to a [`Hotel`].
#[derive(Clone, Debug)]
pub struct CreateRoom {
    /// [`Caller`] adding the [`Room`].
    pub caller: Caller,

    /// ID of the [`Hotel`] to add the [`Room`] to.
    pub hotel_id: hotel::Id,

    /// [`room::Number`] of a new [`Room`].
    pub number: room::Number,

    /// [`room::Kind`] of a new [`Room`].
    pub kind: room::Kind,

    /// Nightly [`room::Price`] of a new [`Room`].
    pub price: room::Price,

    /// Maximum [`room::Occupancy`] of a new [`Room`].
    pub max_occupancy: room::Occupancy,
}

impl<Db> Command<CreateRoom> for Service<Db>
where
    Db: Database<
            Select<By<Option<Hotel>, hotel::Id>>,
            Ok = Option<Hotel>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'n> Database<
            Select<By<Option<Room>, (hotel::Id, &'n room::Number)>>,
            Ok = Option<Room>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Hotel, hotel::Id>>, Err = Traced<database::Error>>
        + Database<Insert<Room>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Room;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateRoom) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateRoom {
            caller,
            hotel_id,
            number,
            kind,
            price,
            max_occupancy,
        } = cmd;

        let hotel = self
            .database()
            .execute(Select(By::<Option<Hotel>, _>::new(hotel_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::HotelNotExists(hotel_id))
            .map_err(tracerr::wrap!())?;

        policy::add_room(caller, hotel.owner_id)
            .ok()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent creation of the same `Room`.
        tx.execute(Lock(By::<Hotel, _>::new(hotel.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Room>, _>::new((hotel.id, &number))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::RoomNumberOccupied(number)));
        }

        let room = Room {
            id: room::Id::new(),
            hotel_id: hotel.id,
            number,
            kind,
            price,
            max_occupancy,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(room.clone()))
            .await
            .map_err(|e| {
                if e.as_ref().is_constraint_violation(constraint::ROOM_NUMBER) {
                    tracerr::new!(E::RoomNumberOccupied(room.number.clone()))
                } else {
                    (tracerr::map_from_and_wrap!(=> E))(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(room)
    }
}

/// Error of [`CreateRoom`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not allowed to add [`Room`]s to the [`Hotel`].
    #[display("Forbidden: {_0}")]
    Forbidden(policy::Reason),

    /// [`Hotel`] with the provided ID does not exist.
    #[display("`Hotel(id: {_0})` does not exist")]
    #[from(ignore)]
    HotelNotExists(#[error(not(source))] hotel::Id),

    /// [`room::Number`] is already occupied in the [`Hotel`].
    #[display("`{_0}` room number is occupied")]
    #[from(ignore)]
    RoomNumberOccupied(#[error(not(source))] room::Number),
}
