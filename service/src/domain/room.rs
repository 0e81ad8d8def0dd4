//! [`Room`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::hotel;
#[cfg(doc)]
use crate::domain::Hotel;

/// Bookable room of a [`Hotel`].
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// ID of the [`Hotel`] this [`Room`] belongs to.
    pub hotel_id: hotel::Id,

    /// [`Number`] of this [`Room`].
    ///
    /// Unique within its [`Hotel`].
    pub number: Number,

    /// [`Kind`] of this [`Room`].
    pub kind: Kind,

    /// [`Price`] of a single night in this [`Room`].
    pub price: Price,

    /// Maximum [`Occupancy`] of this [`Room`].
    pub max_occupancy: Occupancy,

    /// [`DateTime`] when this [`Room`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Room`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Number of a [`Room`] (`101`, `A-12`, etc).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        !number.is_empty() && number.trim() == number && number.len() <= 32
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Kind of a [`Room`] (`single`, `deluxe`, etc).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Kind(String);

impl Kind {
    /// Creates a new [`Kind`] if the given `kind` is valid.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        let kind = kind.into();
        Self::check(&kind).then_some(Self(kind))
    }

    /// Checks whether the given `kind` is a valid [`Kind`].
    fn check(kind: impl AsRef<str>) -> bool {
        let kind = kind.as_ref();
        !kind.is_empty() && kind.trim() == kind && kind.len() <= 64
    }
}

impl FromStr for Kind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Kind`")
    }
}

/// Nightly price of a [`Room`].
///
/// Always positive.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Money);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is positive.
    #[must_use]
    pub fn new(amount: Money) -> Option<Self> {
        (!amount.is_zero()).then_some(Self(amount))
    }

    /// Returns the [`Money`] amount of this [`Price`].
    #[must_use]
    pub const fn get(self) -> Money {
        self.0
    }
}

/// Maximum number of guests a [`Room`] accommodates.
///
/// Always positive, and never exceeds [`Occupancy::MAX`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Occupancy(u16);

impl Occupancy {
    /// Largest possible [`Occupancy`].
    pub const MAX: u16 = 1000;

    /// Creates a new [`Occupancy`] if the given `guests` number is positive
    /// and doesn't exceed [`Occupancy::MAX`].
    #[must_use]
    pub const fn new(guests: u16) -> Option<Self> {
        if guests == 0 || guests > Self::MAX {
            None
        } else {
            Some(Self(guests))
        }
    }

    /// Returns the number of guests of this [`Occupancy`].
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// [`DateTime`] when a [`Room`] was created.
pub type CreationDateTime = DateTimeOf<(Room, unit::Creation)>;
