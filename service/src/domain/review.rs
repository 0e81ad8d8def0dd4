//! [`Review`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, hotel, user};
#[cfg(doc)]
use crate::domain::{Booking, Hotel, User};

/// Review of a [`Hotel`] left by a [`User`] after the stay.
#[derive(Clone, Debug)]
pub struct Review {
    /// ID of this [`Review`].
    pub id: Id,

    /// ID of the [`User`] who left this [`Review`].
    pub user_id: user::Id,

    /// ID of the reviewed [`Booking`].
    ///
    /// Single [`User`] may review a [`Booking`] only once.
    pub booking_id: booking::Id,

    /// ID of the reviewed [`Hotel`].
    pub hotel_id: hotel::Id,

    /// [`Score`] given by this [`Review`].
    pub score: Score,

    /// [`Comment`] of this [`Review`], if any.
    pub comment: Option<Comment>,

    /// [`DateTime`] when this [`Review`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Review`].
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

/// Score of a [`Review`], from [`Score::MIN`] to [`Score::MAX`] stars.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Score(u8);

impl Score {
    /// Lowest possible [`Score`].
    pub const MIN: u8 = 1;

    /// Highest possible [`Score`].
    pub const MAX: u8 = 5;

    /// Creates a new [`Score`] if the given `stars` are in range.
    #[must_use]
    pub const fn new(stars: u8) -> Option<Self> {
        if stars >= Self::MIN && stars <= Self::MAX {
            Some(Self(stars))
        } else {
            None
        }
    }

    /// Returns the number of stars of this [`Score`].
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Free-form comment of a [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Comment(String);

impl Comment {
    /// Creates a new [`Comment`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Comment`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= 4096
    }
}

impl FromStr for Comment {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Comment`")
    }
}

/// [`DateTime`] when a [`Review`] was created.
pub type CreationDateTime = DateTimeOf<(Review, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Comment, Score};

    #[test]
    fn score_is_bounded() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(6).is_none());
        for stars in 1..=5 {
            assert_eq!(Score::new(stars).map(Score::get), Some(stars));
        }
    }

    #[test]
    fn comment_is_not_blank() {
        assert!(Comment::new("Lovely stay").is_some());
        assert!(Comment::new("   ").is_none());
    }
}
