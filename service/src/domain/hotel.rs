//! [`Hotel`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{review, user};

/// Hotel offering [`Room`]s for booking.
///
/// [`Room`]: crate::domain::Room
#[derive(Clone, Debug)]
pub struct Hotel {
    /// ID of this [`Hotel`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Hotel`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// [`Name`] of this [`Hotel`].
    pub name: Name,

    /// [`Description`] of this [`Hotel`], if any.
    pub description: Option<Description>,

    /// [`City`] this [`Hotel`] is located in.
    pub city: City,

    /// [`Country`] this [`Hotel`] is located in.
    pub country: Country,

    /// [`Amenity`] labels of this [`Hotel`].
    pub amenities: Vec<Amenity>,

    /// Aggregated [`Rating`] of this [`Hotel`].
    pub rating: Rating,

    /// [`DateTime`] when this [`Hotel`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Hotel`].
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

/// Defines a validated string newtype of a [`Hotel`] attribute.
macro_rules! define_label {
    ($(#[$meta:meta])* $name:ident, $min:literal..=$max:literal) => {
        $(#[$meta])*
        #[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] if the given ",
                "`value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            #[doc = concat!(
                "Checks whether the given `value` is a valid [`",
                stringify!($name), "`].",
            )]
            fn check(value: impl AsRef<str>) -> bool {
                let value = value.as_ref();
                let len = value.chars().count();
                value.trim() == value && ($min..=$max).contains(&len)
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

define_label!(
    /// Name of a [`Hotel`].
    Name, 2..=256
);

define_label!(
    /// Description of a [`Hotel`].
    Description, 1..=4096
);

define_label!(
    /// City a [`Hotel`] is located in.
    City, 2..=128
);

define_label!(
    /// Country a [`Hotel`] is located in.
    Country, 2..=128
);

define_label!(
    /// Amenity label of a [`Hotel`] (`wifi`, `pool`, etc).
    Amenity, 1..=64
);

/// Aggregated rating of a [`Hotel`] over all its [`Review`]s.
///
/// [`Review`]: crate::domain::Review
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rating {
    /// Mean of all the [`review::Score`]s, if any.
    pub average: Option<Decimal>,

    /// Number of [`review::Score`]s folded into the [`Rating::average`].
    pub total_reviews: u32,
}

impl Rating {
    /// [`Rating`] of a [`Hotel`] without any reviews.
    pub const NONE: Self = Self {
        average: None,
        total_reviews: 0,
    };

    /// Folds the provided [`review::Score`] into this [`Rating`].
    ///
    /// A zero `average` with no reviews is treated the same way as the
    /// absent one.
    ///
    /// # Errors
    ///
    /// With an [`InvalidRating`] if this [`Rating`] is not a mean of
    /// [`Rating::total_reviews`] scores.
    pub fn with_review(self, score: review::Score) -> Result<Self, InvalidRating> {
        let score = Decimal::from(score.get());

        let average = match (self.average, self.total_reviews) {
            (None, 0) => Decimal::ZERO,
            (Some(avg), 0) if avg.is_zero() => Decimal::ZERO,
            (Some(avg), n)
                if n > 0
                    && avg >= Decimal::from(review::Score::MIN)
                    && avg <= Decimal::from(review::Score::MAX) =>
            {
                avg
            }
            _ => return Err(InvalidRating(self)),
        };
        let total_reviews =
            self.total_reviews.checked_add(1).ok_or(InvalidRating(self))?;

        let sum = average
            .checked_mul(Decimal::from(self.total_reviews))
            .and_then(|s| s.checked_add(score))
            .ok_or(InvalidRating(self))?;
        let average = sum
            .checked_div(Decimal::from(total_reviews))
            .ok_or(InvalidRating(self))?
            .normalize();

        Ok(Self {
            average: Some(average),
            total_reviews,
        })
    }
}

/// Error of a malformed [`Rating`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("malformed `Rating`: {_0:?}")]
pub struct InvalidRating(#[error(not(source))] pub Rating);

/// [`DateTime`] when a [`Hotel`] was created.
pub type CreationDateTime = DateTimeOf<(Hotel, unit::Creation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::domain::review::Score;

    use super::{Amenity, City, Name, Rating};

    fn score(n: u8) -> Score {
        Score::new(n).unwrap()
    }

    #[test]
    fn validates_labels() {
        assert!(Name::new("Grand Budapest").is_some());
        assert!(Name::new("G").is_none());
        assert!(City::new("Rome").is_some());
        assert!(City::new(" Rome").is_none());
        assert!(Amenity::new("wifi").is_some());
        assert!(Amenity::new("").is_none());
    }

    #[test]
    fn converges_to_mean() {
        let rating = [4, 5, 3].into_iter().try_fold(Rating::NONE, |r, n| {
            r.with_review(score(n))
        });

        assert_eq!(
            rating.unwrap(),
            Rating {
                average: Some(Decimal::from(4)),
                total_reviews: 3,
            },
        );
    }

    #[test]
    fn seeds_from_zero_average() {
        let seed = Rating {
            average: Some(Decimal::ZERO),
            total_reviews: 0,
        };

        let rating = seed.with_review(score(5)).unwrap();

        assert_eq!(rating.average, Some(Decimal::from(5)));
        assert_eq!(rating.total_reviews, 1);
    }

    #[test]
    fn keeps_fractional_mean() {
        let rating = Rating::NONE
            .with_review(score(4))
            .and_then(|r| r.with_review(score(5)))
            .unwrap();

        assert_eq!(rating.average, Some(Decimal::new(45, 1)));
        assert_eq!(rating.total_reviews, 2);
    }

    #[test]
    fn rejects_malformed() {
        for malformed in [
            Rating {
                average: None,
                total_reviews: 2,
            },
            Rating {
                average: Some(Decimal::from(3)),
                total_reviews: 0,
            },
            Rating {
                average: Some(Decimal::from(7)),
                total_reviews: 1,
            },
            Rating {
                average: Some(Decimal::ZERO),
                total_reviews: 4,
            },
        ] {
            assert!(malformed.with_review(score(3)).is_err(), "{malformed:?}");
        }
    }
}
