//! [`Command`] for reviewing a [`Hotel`] after a stay.

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking::{self, NotReviewable},
        hotel::{self, InvalidRating},
        review, user, Booking, Hotel, Review,
    },
    infra::{database, database::constraint, Database},
    policy::{self, Caller},
    Service,
};

use super::Command;

/// [`Command`] for reviewing a [`Hotel`] after a stay.
///
/// Folds the [`review::Score`] into the [`hotel::Rating`] of the reviewed
/// [`Hotel`].
#[derive(Clone, Debug)]
pub struct CreateReview {
    /// [`Caller`] leaving the [`Review`].
    pub caller: Caller,

    /// ID of the [`Booking`] to review.
    pub booking_id: booking::Id,

    /// [`review::Score`] of a new [`Review`].
    pub score: review::Score,

    /// [`review::Comment`] of a new [`Review`], if any.
    pub comment: Option<review::Comment>,
}

/// Output of [`CreateReview`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`Review`].
    pub review: Review,

    /// Updated [`hotel::Rating`] of the reviewed [`Hotel`].
    pub rating: hotel::Rating,
}

impl<Db> Command<CreateReview> for Service<Db>
where
    Db: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Review>, (user::Id, booking::Id)>>,
            Ok = Option<Review>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Lock<By<Hotel, hotel::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Hotel>, hotel::Id>>,
            Ok = Option<Hotel>,
            Err = Traced<database::Error>,
        > + Database<Insert<Review>, Err = Traced<database::Error>>
        + Database<Update<Hotel>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateReview) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReview {
            caller,
            booking_id,
            score,
            comment,
        } = cmd;

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if booking.is_cancelled() {
            return Err(tracerr::new!(E::NotReviewable(
                NotReviewable::Cancelled
            )));
        }

        policy::manage_booking(caller, booking.user_id)
            .ok()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let now = DateTime::now();
        booking
            .check_reviewable(now)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let existing = self
            .database()
            .execute(Select(By::<Option<Review>, _>::new((
                caller.id, booking.id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::AlreadyReviewed(booking.id)));
        }

        let review = Review {
            id: review::Id::new(),
            user_id: caller.id,
            booking_id: booking.id,
            hotel_id: booking.hotel_id,
            score,
            comment,
            created_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid lost updates of the `hotel::Rating`.
        tx.execute(Lock(By::<Hotel, _>::new(booking.hotel_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut hotel = tx
            .execute(Select(By::<Option<Hotel>, _>::new(booking.hotel_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::HotelNotExists(booking.hotel_id))
            .map_err(tracerr::wrap!())?;
        hotel.rating = hotel
            .rating
            .with_review(score)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        tx.execute(Insert(review.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_constraint_violation(constraint::REVIEW_BOOKING)
                {
                    tracerr::new!(E::AlreadyReviewed(booking.id))
                } else {
                    (tracerr::map_from_and_wrap!(=> E))(e)
                }
            })
            .map(drop)?;
        let rating = hotel.rating;
        tx.execute(Update(hotel))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            review_id = %review.id,
            hotel_id = %review.hotel_id,
            total_reviews = rating.total_reviews,
            "review created",
        );

        Ok(Output { review, rating })
    }
}

/// Error of [`CreateReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is already reviewed by the [`Caller`].
    #[display("`Booking(id: {_0})` is already reviewed")]
    #[from(ignore)]
    AlreadyReviewed(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Caller`] is not allowed to review the [`Booking`].
    #[display("Forbidden: {_0}")]
    Forbidden(policy::Reason),

    /// [`Hotel`] of the [`Booking`] does not exist.
    #[display("`Hotel(id: {_0})` does not exist")]
    #[from(ignore)]
    HotelNotExists(#[error(not(source))] hotel::Id),

    /// Stored [`hotel::Rating`] is malformed.
    #[display("`Hotel` data is invalid: {_0}")]
    InvalidRating(InvalidRating),

    /// [`Booking`] may not be reviewed.
    #[display("`Booking` is not reviewable: {_0}")]
    NotReviewable(NotReviewable),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select, Update},
        DateTime, Money,
    };
    use rust_decimal::Decimal;

    use crate::{
        command::Command as _,
        domain::{
            booking::{self, NotReviewable},
            hotel, review, room,
            user::Role,
            Booking, Hotel,
        },
        infra::database::Memory,
        policy::{Caller, Reason},
        test_util, Service,
    };

    use super::{CreateReview, ExecutionError};

    async fn setup() -> (Service<Memory>, Hotel) {
        let svc = test_util::service();
        let hotel = test_util::hotel(&test_util::caller(Role::Owner));
        svc.database().execute(Insert(hotel.clone())).await.unwrap();
        (svc, hotel)
    }

    async fn stay(
        svc: &Service<Memory>,
        hotel: &Hotel,
        from: i64,
        to: i64,
    ) -> (Caller, Booking) {
        let guest = test_util::caller(Role::Customer);
        let booking = Booking {
            id: booking::Id::new(),
            user_id: guest.id,
            room_id: room::Id::new(),
            hotel_id: hotel.id,
            period: booking::Period::new(
                test_util::day(from),
                test_util::day(to),
            )
            .unwrap(),
            guests: booking::Guests::new(1).unwrap(),
            total_price: Money::new(100.into()).unwrap(),
            status: booking::Status::Confirmed,
            created_at: DateTime::now().coerce(),
            cancelled_at: None,
        };
        svc.database().execute(Insert(booking.clone())).await.unwrap();
        (guest, booking)
    }

    fn cmd(caller: Caller, booking: &Booking, stars: u8) -> CreateReview {
        CreateReview {
            caller,
            booking_id: booking.id,
            score: review::Score::new(stars).unwrap(),
            comment: review::Comment::new("Nice"),
        }
    }

    async fn stored_rating(svc: &Service<Memory>, id: hotel::Id) -> hotel::Rating {
        svc.database()
            .execute(Select(By::<Option<Hotel>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
            .rating
    }

    #[tokio::test]
    async fn aggregates_rating() {
        let (svc, hotel) = setup().await;

        for stars in [4, 5, 3] {
            let (guest, booking) = stay(&svc, &hotel, -5, -2).await;
            _ = svc.execute(cmd(guest, &booking, stars)).await.unwrap();
        }

        assert_eq!(
            stored_rating(&svc, hotel.id).await,
            hotel::Rating {
                average: Some(Decimal::from(4)),
                total_reviews: 3,
            },
        );
        assert_eq!(svc.database().reviews().await.len(), 3);
    }

    #[tokio::test]
    async fn reviewable_on_checkout_day() {
        let (svc, hotel) = setup().await;
        let (guest, booking) = stay(&svc, &hotel, -2, 0).await;

        let out = svc.execute(cmd(guest, &booking, 5)).await.unwrap();

        assert_eq!(out.rating.total_reviews, 1);
        assert_eq!(out.review.hotel_id, hotel.id);
    }

    #[tokio::test]
    async fn not_reviewable_before_checkout() {
        let (svc, hotel) = setup().await;
        let (guest, booking) = stay(&svc, &hotel, -1, 1).await;

        let err = svc.execute(cmd(guest, &booking, 5)).await.unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::NotReviewable(NotReviewable::StayNotFinished),
        ));
        assert_eq!(stored_rating(&svc, hotel.id).await, hotel::Rating::NONE);
    }

    #[tokio::test]
    async fn cancelled_is_checked_before_ownership() {
        let (svc, hotel) = setup().await;
        let (_, booking) = stay(&svc, &hotel, -5, -2).await;
        let cancelled = svc
            .database()
            .execute(Update(booking::Transition {
                id: booking.id,
                expected: booking::Status::Confirmed,
                status: booking::Status::Cancelled,
                cancelled_at: None,
            }))
            .await
            .unwrap();
        assert!(cancelled);

        let err = svc
            .execute(cmd(test_util::caller(Role::Customer), &booking, 4))
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::NotReviewable(NotReviewable::Cancelled),
        ));
    }

    #[tokio::test]
    async fn only_guest_reviews() {
        let (svc, hotel) = setup().await;
        let (_, booking) = stay(&svc, &hotel, -5, -2).await;

        let err = svc
            .execute(cmd(test_util::caller(Role::Customer), &booking, 4))
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Forbidden(Reason::NotOwner),
        ));
    }

    #[tokio::test]
    async fn reviews_once() {
        let (svc, hotel) = setup().await;
        let (guest, booking) = stay(&svc, &hotel, -5, -2).await;
        _ = svc.execute(cmd(guest, &booking, 4)).await.unwrap();

        let err = svc.execute(cmd(guest, &booking, 2)).await.unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::AlreadyReviewed(_)));

        let err = test_util::stale(&svc)
            .execute(cmd(guest, &booking, 2))
            .await
            .unwrap_err();
        assert!(matches!(err.into_inner(), ExecutionError::AlreadyReviewed(_)));

        assert_eq!(
            stored_rating(&svc, hotel.id).await,
            hotel::Rating {
                average: Some(Decimal::from(4)),
                total_reviews: 1,
            },
        );
    }

    #[tokio::test]
    async fn malformed_rating_is_reported() {
        let (svc, mut hotel) = setup().await;
        hotel.rating = hotel::Rating {
            average: None,
            total_reviews: 3,
        };
        svc.database().execute(Update(hotel.clone())).await.unwrap();
        let (guest, booking) = stay(&svc, &hotel, -5, -2).await;

        let err = svc.execute(cmd(guest, &booking, 4)).await.unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::InvalidRating(_)));
        assert!(svc.database().reviews().await.is_empty());
    }
}
