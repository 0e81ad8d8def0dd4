//! [`Booking`] definitions.

use std::time::Duration;

use common::{define_kind, unit, Date, DateTime, DateTimeOf, Money};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{hotel, room, user};
#[cfg(doc)]
use crate::domain::{Hotel, Room, User};

/// Reservation of a [`Room`] for a [`Period`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`User`] who made this [`Booking`].
    pub user_id: user::Id,

    /// ID of the booked [`Room`].
    pub room_id: room::Id,

    /// ID of the [`Hotel`] the booked [`Room`] belongs to.
    pub hotel_id: hotel::Id,

    /// Booked [`Period`].
    pub period: Period,

    /// Number of [`Guests`] staying.
    pub guests: Guests,

    /// Total price of the whole [`Period`].
    pub total_price: Money,

    /// Current [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was cancelled, if it was.
    pub cancelled_at: Option<CancellationDateTime>,
}

impl Booking {
    /// Minimal time left before the check-in for a [`Booking`] to be
    /// cancellable.
    pub const CANCELLATION_DEADLINE: Duration = Duration::from_secs(24 * 60 * 60);

    /// Indicates whether this [`Booking`] is [`Status::Cancelled`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == Status::Cancelled
    }

    /// Indicates whether this [`Booking`] makes its [`Room`] unavailable for
    /// the provided [`Period`].
    ///
    /// [`Status::Cancelled`] [`Booking`]s hold nothing.
    #[must_use]
    pub fn blocks(&self, period: &Period) -> bool {
        !self.is_cancelled() && self.period.overlaps(period)
    }

    /// Checks whether this [`Booking`] may be cancelled at the provided
    /// moment.
    ///
    /// # Errors
    ///
    /// With a [`NotCancellable`] reason if it may not.
    pub fn check_cancellable(&self, now: DateTime) -> Result<(), NotCancellable> {
        if self.is_cancelled() {
            return Err(NotCancellable::AlreadyCancelled);
        }
        if self.period.is_completed(now) {
            return Err(NotCancellable::AlreadyCompleted);
        }
        if now + Self::CANCELLATION_DEADLINE > self.period.starts_at() {
            return Err(NotCancellable::DeadlinePassed);
        }
        Ok(())
    }

    /// Checks whether this [`Booking`] may be reviewed at the provided
    /// moment.
    ///
    /// # Errors
    ///
    /// With a [`NotReviewable`] reason if it may not.
    pub fn check_reviewable(&self, now: DateTime) -> Result<(), NotReviewable> {
        if self.is_cancelled() {
            return Err(NotReviewable::Cancelled);
        }
        if now < self.period.ends_at() {
            return Err(NotReviewable::StayNotFinished);
        }
        Ok(())
    }
}

/// Reason of a [`Booking`] not being cancellable.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum NotCancellable {
    /// [`Booking`] is cancelled already.
    #[display("already cancelled")]
    AlreadyCancelled,

    /// The stay is over.
    #[display("already completed")]
    AlreadyCompleted,

    /// Less than [`Booking::CANCELLATION_DEADLINE`] left before check-in.
    #[display("cancellation deadline passed")]
    DeadlinePassed,
}

/// Reason of a [`Booking`] not being reviewable.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum NotReviewable {
    /// [`Booking`] is cancelled.
    #[display("cancelled")]
    Cancelled,

    /// The check-out hasn't happened yet.
    #[display("stay is not finished")]
    StayNotFinished,
}

/// ID of a [`Booking`].
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

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "[`Booking`] holds its [`Room`] for the [`Period`]."]
        Confirmed = 1,

        #[doc = "[`Booking`] is cancelled and holds nothing."]
        Cancelled = 2,
    }
}

/// Half-open `[check_in, check_out)` range of days a [`Room`] is booked for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Period {
    /// [`Date`] of the check-in.
    check_in: Date,

    /// [`Date`] of the check-out (excluded from the [`Period`]).
    check_out: Date,
}

impl Period {
    /// Creates a new [`Period`] out of the provided [`Date`]s.
    ///
    /// # Errors
    ///
    /// With an [`InvalidRange`] if `check_out` is not strictly after
    /// `check_in`.
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, InvalidRange> {
        if check_out <= check_in {
            return Err(InvalidRange { check_in, check_out });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in [`Date`] of this [`Period`].
    #[must_use]
    pub const fn check_in(&self) -> Date {
        self.check_in
    }

    /// Returns the check-out [`Date`] of this [`Period`].
    #[must_use]
    pub const fn check_out(&self) -> Date {
        self.check_out
    }

    /// Returns the [`DateTime`] this [`Period`] starts at.
    #[must_use]
    pub fn starts_at(&self) -> DateTime {
        self.check_in.start()
    }

    /// Returns the [`DateTime`] this [`Period`] ends at.
    #[must_use]
    pub fn ends_at(&self) -> DateTime {
        self.check_out.start()
    }

    /// Indicates whether the whole check-out day has passed at the provided
    /// moment.
    #[must_use]
    pub fn is_completed(&self, now: DateTime) -> bool {
        self.check_out
            .next_day()
            .is_some_and(|day| now >= day.start())
    }

    /// Returns the number of nights in this [`Period`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from(self.check_in.days_until(self.check_out))
            .expect("infallible")
    }

    /// Indicates whether this [`Period`] shares at least one night with the
    /// `other` one.
    ///
    /// Adjacent [`Period`]s (one's check-out is the other's check-in) don't
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Computes the total price of this [`Period`] for the provided nightly
    /// price.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn price(&self, nightly: room::Price) -> Option<Money> {
        nightly.get().checked_times(self.nights())
    }
}

/// Error of an empty or reversed [`Period`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid range: [{check_in}, {check_out})")]
pub struct InvalidRange {
    /// Provided check-in [`Date`].
    pub check_in: Date,

    /// Provided check-out [`Date`].
    pub check_out: Date,
}

/// Number of guests of a [`Booking`].
///
/// Always positive.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Guests(u16);

impl Guests {
    /// Creates new [`Guests`] if the given `number` is positive.
    #[must_use]
    pub const fn new(number: u16) -> Option<Self> {
        if number == 0 {
            None
        } else {
            Some(Self(number))
        }
    }

    /// Returns the number of these [`Guests`].
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Indicates whether these [`Guests`] fit into the provided
    /// [`room::Occupancy`].
    #[must_use]
    pub const fn fit(self, occupancy: room::Occupancy) -> bool {
        self.0 <= occupancy.get()
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] was cancelled.
pub type CancellationDateTime = DateTimeOf<(Booking, unit::Cancellation)>;

/// Conditional [`Status`] change of a [`Booking`].
///
/// Applies only if the stored [`Status`] still equals the
/// [`Transition::expected`] one.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    /// ID of the [`Booking`] to change.
    pub id: Id,

    /// [`Status`] the [`Booking`] must have at the moment of writing.
    pub expected: Status,

    /// New [`Status`] of the [`Booking`].
    pub status: Status,

    /// New cancellation [`DateTime`] of the [`Booking`].
    pub cancelled_at: Option<CancellationDateTime>,
}

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Money};

    use crate::domain::{hotel, room, user};

    use super::{
        Booking, Guests, Id, NotCancellable, NotReviewable, Period, Status,
    };

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn at(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    fn period(check_in: &str, check_out: &str) -> Period {
        Period::new(date(check_in), date(check_out)).unwrap()
    }

    fn booking(check_in: &str, check_out: &str) -> Booking {
        Booking {
            id: Id::new(),
            user_id: user::Id::new(),
            room_id: room::Id::new(),
            hotel_id: hotel::Id::new(),
            period: period(check_in, check_out),
            guests: Guests::new(2).unwrap(),
            total_price: Money::ZERO,
            status: Status::Confirmed,
            created_at: DateTime::UNIX_EPOCH.coerce(),
            cancelled_at: None,
        }
    }

    #[test]
    fn rejects_empty_periods() {
        assert!(Period::new(date("2025-06-05"), date("2025-06-05")).is_err());
        assert!(Period::new(date("2025-06-05"), date("2025-06-01")).is_err());
        assert_eq!(period("2025-06-01", "2025-06-02").nights(), 1);
    }

    #[test]
    fn overlap_is_symmetric() {
        let booked = period("2025-06-01", "2025-06-05");

        for (other, expected) in [
            (period("2025-06-03", "2025-06-07"), true),
            (period("2025-05-28", "2025-06-02"), true),
            (period("2025-06-02", "2025-06-03"), true),
            (period("2025-05-20", "2025-06-20"), true),
            (period("2025-06-05", "2025-06-08"), false),
            (period("2025-05-28", "2025-06-01"), false),
            (period("2025-07-01", "2025-07-03"), false),
        ] {
            assert_eq!(booked.overlaps(&other), expected, "{other:?}");
            assert_eq!(other.overlaps(&booked), expected, "{other:?}");
        }
    }

    #[test]
    fn prices_per_night() {
        let nightly = room::Price::new(Money::new(100.into()).unwrap()).unwrap();

        assert_eq!(
            period("2025-06-01", "2025-06-04").price(nightly),
            Money::new(300.into()),
        );
        assert_eq!(
            period("2025-06-01", "2025-06-02").price(nightly),
            Money::new(100.into()),
        );
    }

    #[test]
    fn cancellation_deadline() {
        let b = booking("2025-06-10", "2025-06-12");

        assert_eq!(
            b.check_cancellable(at("2025-06-09T01:00:00Z")),
            Err(NotCancellable::DeadlinePassed),
        );
        assert_eq!(b.check_cancellable(at("2025-06-08T23:00:00Z")), Ok(()));
        assert_eq!(b.check_cancellable(at("2025-06-09T00:00:00Z")), Ok(()));
    }

    #[test]
    fn cancellation_of_finished_or_cancelled() {
        let mut b = booking("2025-06-10", "2025-06-12");

        assert_eq!(
            b.check_cancellable(at("2025-06-13T00:00:00Z")),
            Err(NotCancellable::AlreadyCompleted),
        );
        assert_eq!(
            b.check_cancellable(at("2025-06-12T23:59:59Z")),
            Err(NotCancellable::DeadlinePassed),
        );

        b.status = Status::Cancelled;
        assert_eq!(
            b.check_cancellable(at("2025-06-01T00:00:00Z")),
            Err(NotCancellable::AlreadyCancelled),
        );
    }

    #[test]
    fn reviewable_at_checkout() {
        let mut b = booking("2025-06-10", "2025-06-12");

        assert_eq!(
            b.check_reviewable(at("2025-06-11T23:59:59Z")),
            Err(NotReviewable::StayNotFinished),
        );
        assert_eq!(b.check_reviewable(at("2025-06-12T00:00:00Z")), Ok(()));
        assert_eq!(b.check_reviewable(at("2025-06-20T00:00:00Z")), Ok(()));

        b.status = Status::Cancelled;
        assert_eq!(
            b.check_reviewable(at("2025-06-20T00:00:00Z")),
            Err(NotReviewable::Cancelled),
        );
    }

    #[test]
    fn cancelled_bookings_block_nothing() {
        let mut b = booking("2025-06-01", "2025-06-05");
        let wanted = period("2025-06-03", "2025-06-07");

        assert!(b.blocks(&wanted));

        b.status = Status::Cancelled;
        assert!(!b.blocks(&wanted));
    }

    #[test]
    fn guests_fit_occupancy() {
        let occupancy = room::Occupancy::new(2).unwrap();

        assert!(Guests::new(2).unwrap().fit(occupancy));
        assert!(!Guests::new(3).unwrap().fit(occupancy));
        assert!(Guests::new(0).is_none());
    }
}
