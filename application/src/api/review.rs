//! [`Review`]-related endpoints.

use axum::{extract::rejection::JsonRejection, Json};
use common::DateTime;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, booking, hotel, review, user},
    policy,
};

use crate::{
    api::{self, valid},
    define_error, AsError, Context, Error,
};

/// [`Review`] representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// ID of this [`Review`].
    pub id: review::Id,

    /// ID of the reviewing user.
    pub user_id: user::Id,

    /// ID of the reviewed booking.
    pub booking_id: booking::Id,

    /// ID of the reviewed hotel.
    pub hotel_id: hotel::Id,

    /// Score of this [`Review`].
    pub rating: u8,

    /// Comment of this [`Review`], if any.
    pub comment: Option<review::Comment>,

    /// [`DateTime`] when this [`Review`] was left.
    pub created_at: DateTime,
}

impl From<domain::Review> for Review {
    fn from(review: domain::Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            booking_id: review.booking_id,
            hotel_id: review.hotel_id,
            rating: review.score.get(),
            comment: review.comment,
            created_at: review.created_at.coerce(),
        }
    }
}

/// Request body of the [`create()`] endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// ID of the reviewed booking.
    pub booking_id: booking::Id,

    /// Score from 1 to 5.
    pub rating: u8,

    /// Free-form comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl CreateRequest {
    /// Validates this [`CreateRequest`] into a [`command::CreateReview`]
    /// issued by the provided [`policy::Caller`].
    fn into_command(
        self,
        caller: policy::Caller,
    ) -> Result<command::CreateReview, Error> {
        let Self {
            booking_id,
            rating,
            comment,
        } = self;

        Ok(command::CreateReview {
            caller,
            booking_id,
            score: valid(review::Score::new(rating))?,
            comment: comment
                .map(|c| valid(review::Comment::new(c)))
                .transpose()?,
        })
    }
}

/// Reviews the hotel of the caller's finished stay.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `FORBIDDEN` - the caller is not a customer, or the booking is made by
///   another user;
/// - `INVALID_REQUEST` - the request body is invalid;
/// - `BOOKING_NOT_FOUND` - the booking doesn't exist;
/// - `BOOKING_NOT_ELIGIBLE` - the booking is cancelled, or the stay isn't
///   finished yet;
/// - `ALREADY_REVIEWED` - the booking is reviewed already;
/// - `HOTEL_DATA_INVALID` - the stored hotel rating is malformed.
#[tracing::instrument(skip_all, fields(http.route = "POST /reviews"))]
pub async fn create(
    ctx: Context,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> api::Created<Review> {
    policy::require(ctx.caller(), user::Role::Customer)
        .ok()
        .map_err(AsError::into_error)?;
    let Json(body) = body?;

    let out = ctx
        .service()
        .execute(body.into_command(ctx.caller())?)
        .await
        .map_err(AsError::into_error)?;

    Ok(api::created(out.review.into()))
}

impl AsError for command::create_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_REVIEWED"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` is reviewed already"]
                AlreadyReviewed,

                #[code = "BOOKING_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Booking` does not exist"]
                BookingNotFound,

                #[code = "BOOKING_NOT_ELIGIBLE"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` is not eligible for a review"]
                NotEligible,

                #[code = "HOTEL_DATA_INVALID"]
                #[status = INTERNAL_SERVER_ERROR]
                #[message = "`Hotel` data is invalid"]
                HotelDataInvalid,
            }
        }

        match self {
            Self::AlreadyReviewed(_) => Some(Error::AlreadyReviewed.into()),
            Self::BookingNotExists(_) => Some(Error::BookingNotFound.into()),
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(r) => r.try_as_error(),
            Self::HotelNotExists(_) | Self::InvalidRating(_) => {
                Some(Error::HotelDataInvalid.into())
            }
            Self::NotReviewable(_) => Some(Error::NotEligible.into()),
        }
    }
}
