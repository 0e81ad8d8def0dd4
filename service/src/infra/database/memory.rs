//! In-memory [`Database`] implementation for tests.

use std::sync::Arc;

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{
        booking, hotel, room, user, Booking, Hotel, Review, Room, User,
    },
    infra::database::{self, constraint, Database},
    read,
};

/// In-memory [`Database`] enforcing the same constraints as the real one.
///
/// Transactions are not isolated: every write is visible immediately, and
/// [`Commit`] does nothing.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored data, shared between clones.
    state: Arc<Mutex<State>>,

    /// Whether reads lag behind concurrent writes.
    stale: bool,
}

impl Memory {
    /// Returns a view of this [`Memory`] whose reads miss concurrent writes:
    /// [`Booking`]s of a [`Room`] and [`Review`]s are never found, while a
    /// found [`Booking`] is always [`booking::Status::Confirmed`].
    ///
    /// Writes are performed upon the actual data.
    #[must_use]
    pub fn stale(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            stale: true,
        }
    }

    /// Returns all the stored [`Booking`]s.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.lock().await.bookings.clone()
    }

    /// Returns all the stored [`Review`]s.
    pub async fn reviews(&self) -> Vec<Review> {
        self.state.lock().await.reviews.clone()
    }
}

/// Data stored in a [`Memory`].
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: Vec<User>,

    /// Stored [`Hotel`]s.
    hotels: Vec<Hotel>,

    /// Stored [`Room`]s.
    rooms: Vec<Room>,

    /// Stored [`Booking`]s.
    bookings: Vec<Booking>,

    /// Stored [`Review`]s.
    reviews: Vec<Review>,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Storage constraint is violated.
    #[display("`{_0}` constraint is violated")]
    ConstraintViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the provided
    /// `constraint`.
    #[must_use]
    pub fn is_constraint_violation(&self, constraint: &str) -> bool {
        match self {
            Self::ConstraintViolation(c) => *c == constraint,
        }
    }
}

/// Returns a [`Traced`] violation of the provided `constraint`.
fn violation(constraint: &'static str) -> Traced<database::Error> {
    tracerr::new!(database::Error::from(Error::ConstraintViolation(constraint)))
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Hotel, hotel::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Hotel, hotel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Room, room::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| &u.email == email).cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(violation(constraint::USER_EMAIL));
        }
        state.users.push(user);
        Ok(())
    }
}

impl Database<Select<By<Option<Hotel>, hotel::Id>>> for Memory {
    type Ok = Option<Hotel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Hotel>, hotel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let state = self.state.lock().await;
        Ok(state.hotels.iter().find(|h| h.id == id).cloned())
    }
}

impl Database<Insert<Hotel>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(hotel): Insert<Hotel>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(hotel)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Hotel>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(hotel): Update<Hotel>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        if let Some(stored) = state.hotels.iter_mut().find(|h| h.id == hotel.id)
        {
            *stored = hotel;
        } else {
            state.hotels.push(hotel);
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Room>, room::Id>>> for Memory {
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let state = self.state.lock().await;
        Ok(state.rooms.iter().find(|r| r.id == id).cloned())
    }
}

impl<'n> Database<Select<By<Option<Room>, (hotel::Id, &'n room::Number)>>>
    for Memory
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, (hotel::Id, &'n room::Number)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (hotel_id, number) = by.into_inner();
        let state = self.state.lock().await;
        Ok(state
            .rooms
            .iter()
            .find(|r| r.hotel_id == hotel_id && &r.number == number)
            .cloned())
    }
}

impl Database<Select<By<Vec<Room>, hotel::Id>>> for Memory {
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, hotel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let hotel_id = by.into_inner();
        let state = self.state.lock().await;
        Ok(state
            .rooms
            .iter()
            .filter(|r| r.hotel_id == hotel_id)
            .cloned()
            .collect())
    }
}

impl Database<Insert<Room>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room): Insert<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        if state
            .rooms
            .iter()
            .any(|r| r.hotel_id == room.hotel_id && r.number == room.number)
        {
            return Err(violation(constraint::ROOM_NUMBER));
        }
        state.rooms.push(room);
        Ok(())
    }
}

impl Database<Select<By<Option<Booking>, booking::Id>>> for Memory {
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let state = self.state.lock().await;
        let mut found = state.bookings.iter().find(|b| b.id == id).cloned();
        if self.stale {
            if let Some(b) = found.as_mut() {
                b.status = booking::Status::Confirmed;
                b.cancelled_at = None;
            }
        }
        Ok(found)
    }
}

impl Database<Select<By<Vec<Booking>, room::Id>>> for Memory {
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.stale {
            return Ok(vec![]);
        }
        let room_id = by.into_inner();
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.room_id == room_id)
            .cloned()
            .collect())
    }
}

impl Database<Insert<Booking>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        if !booking.is_cancelled()
            && state
                .bookings
                .iter()
                .any(|b| b.room_id == booking.room_id && b.blocks(&booking.period))
        {
            return Err(violation(constraint::BOOKING_PERIOD));
        }
        state.bookings.push(booking);
        Ok(())
    }
}

impl Database<Update<booking::Transition>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<booking::Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking::Transition {
            id,
            expected,
            status,
            cancelled_at,
        } = transition;

        let mut state = self.state.lock().await;
        let Some(stored) = state
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == expected)
        else {
            return Ok(false);
        };
        stored.status = status;
        stored.cancelled_at = cancelled_at;
        Ok(true)
    }
}

impl Database<Select<By<Option<Review>, (user::Id, booking::Id)>>> for Memory {
    type Ok = Option<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Review>, (user::Id, booking::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.stale {
            return Ok(None);
        }
        let (user_id, booking_id) = by.into_inner();
        let state = self.state.lock().await;
        Ok(state
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.booking_id == booking_id)
            .cloned())
    }
}

impl Database<Insert<Review>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(review): Insert<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state.lock().await;
        if state.reviews.iter().any(|r| {
            r.user_id == review.user_id && r.booking_id == review.booking_id
        }) {
            return Err(violation(constraint::REVIEW_BOOKING));
        }
        state.reviews.push(review);
        Ok(())
    }
}

impl Database<Select<By<Vec<read::hotel::list::Item>, read::hotel::list::Filter>>>
    for Memory
{
    type Ok = Vec<read::hotel::list::Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::hotel::list::Item>, read::hotel::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let state = self.state.lock().await;
        Ok(state
            .hotels
            .iter()
            .filter(|h| filter.city.as_ref().map_or(true, |c| &h.city == c))
            .filter(|h| {
                filter.country.as_ref().map_or(true, |c| &h.country == c)
            })
            .filter(|h| {
                filter.min_rating.map_or(true, |min| {
                    h.rating.average.is_some_and(|avg| avg >= min)
                })
            })
            .filter(|h| {
                !filter.bounds_price()
                    || state.rooms.iter().any(|r| {
                        r.hotel_id == h.id && filter.admits_price(r.price.get())
                    })
            })
            .map(|h| read::hotel::list::Item {
                hotel: h.clone(),
                min_price: state
                    .rooms
                    .iter()
                    .filter(|r| r.hotel_id == h.id)
                    .map(|r| r.price.get())
                    .min(),
            })
            .collect())
    }
}

impl
    Database<
        Select<By<Vec<read::booking::list::Item>, read::booking::list::Filter>>,
    > for Memory
{
    type Ok = Vec<read::booking::list::Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::booking::list::Item>, read::booking::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Filter { user_id, status } = by.into_inner();
        let state = self.state.lock().await;
        let mut items = state
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .filter(|b| status.map_or(true, |s| b.status == s))
            .filter_map(|b| {
                let hotel = state.hotels.iter().find(|h| h.id == b.hotel_id)?;
                let room = state.rooms.iter().find(|r| r.id == b.room_id)?;
                Some(read::booking::list::Item {
                    booking: b.clone(),
                    hotel_name: hotel.name.clone(),
                    room_number: room.number.clone(),
                    room_kind: room.kind.clone(),
                })
            })
            .collect::<Vec<_>>();
        items.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(items)
    }
}
