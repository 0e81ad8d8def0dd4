//! [`Booking`]-related endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use common::{Date, DateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, booking, hotel, room, user},
    policy, query, read, Query as _,
};

use crate::{
    api::{self, valid},
    define_error, AsError, Context, Error,
};

/// [`Booking`] representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: booking::Id,

    /// ID of the [`User`] who made this [`Booking`].
    ///
    /// [`User`]: domain::User
    pub user_id: user::Id,

    /// ID of the booked [`Room`].
    ///
    /// [`Room`]: domain::Room
    pub room_id: room::Id,

    /// ID of the [`Hotel`] of the booked [`Room`].
    ///
    /// [`Hotel`]: domain::Hotel
    /// [`Room`]: domain::Room
    pub hotel_id: hotel::Id,

    /// [`Date`] of the check-in.
    pub check_in_date: Date,

    /// [`Date`] of the check-out.
    pub check_out_date: Date,

    /// Number of guests staying.
    pub guests: u16,

    /// Total price of the whole stay.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,

    /// Current status of this [`Booking`].
    pub status: booking::Status,

    /// [`DateTime`] when this [`Booking`] was made.
    pub booking_date: DateTime,

    /// [`DateTime`] when this [`Booking`] was cancelled, if it was.
    pub cancelled_at: Option<DateTime>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            room_id: booking.room_id,
            hotel_id: booking.hotel_id,
            check_in_date: booking.period.check_in(),
            check_out_date: booking.period.check_out(),
            guests: booking.guests.get(),
            total_price: booking.total_price.amount(),
            status: booking.status,
            booking_date: booking.created_at.coerce(),
            cancelled_at: booking.cancelled_at.map(|at| at.coerce()),
        }
    }
}

/// Request body of the [`create()`] endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// ID of the [`Room`] to book.
    ///
    /// [`Room`]: domain::Room
    pub room_id: room::Id,

    /// [`Date`] of the check-in.
    pub check_in_date: Date,

    /// [`Date`] of the check-out.
    pub check_out_date: Date,

    /// Number of guests staying.
    pub guests: u16,
}

impl CreateRequest {
    /// Validates this [`CreateRequest`] into a [`command::CreateBooking`]
    /// issued by the provided [`policy::Caller`].
    fn into_command(
        self,
        caller: policy::Caller,
    ) -> Result<command::CreateBooking, Error> {
        let Self {
            room_id,
            check_in_date,
            check_out_date,
            guests,
        } = self;

        Ok(command::CreateBooking {
            caller,
            room_id,
            check_in: check_in_date,
            check_out: check_out_date,
            guests: valid(booking::Guests::new(guests))?,
        })
    }
}

/// Books a [`Room`] for the caller.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `FORBIDDEN` - the caller is not a customer;
/// - `INVALID_REQUEST` - the request body is invalid;
/// - `ROOM_NOT_FOUND` - the [`Room`] doesn't exist;
/// - `INVALID_CAPACITY` - the [`Room`] doesn't fit all the guests;
/// - `INVALID_DATES` - the check-in is in the past, or not before the
///   check-out;
/// - `ROOM_NOT_AVAILABLE` - the [`Room`] is booked for an overlapping period.
///
/// [`Room`]: domain::Room
#[tracing::instrument(skip_all, fields(http.route = "POST /bookings"))]
pub async fn create(
    ctx: Context,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> api::Created<Booking> {
    policy::book(ctx.caller()).ok().map_err(AsError::into_error)?;
    let Json(body) = body?;

    let booking = ctx
        .service()
        .execute(body.into_command(ctx.caller())?)
        .await
        .map_err(AsError::into_error)?;

    Ok(api::created(booking.into()))
}

/// Query parameters of the [`list()`] endpoint.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ListParams {
    /// Status of the listed [`Booking`]s.
    pub status: Option<booking::Status>,
}

/// Hotel summary of a [`ListItem`].
#[derive(Clone, Debug, Serialize)]
pub struct HotelSummary {
    /// Name of the booked [`Hotel`].
    ///
    /// [`Hotel`]: domain::Hotel
    pub name: hotel::Name,
}

/// Room summary of a [`ListItem`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// Number of the booked [`Room`].
    ///
    /// [`Room`]: domain::Room
    pub room_number: room::Number,

    /// Type of the booked [`Room`].
    ///
    /// [`Room`]: domain::Room
    pub room_type: room::Kind,
}

/// [`Booking`] list item representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
pub struct ListItem {
    /// Listed [`Booking`].
    #[serde(flatten)]
    pub booking: Booking,

    /// Booked hotel.
    pub hotel: HotelSummary,

    /// Booked room.
    pub room: RoomSummary,
}

impl From<read::booking::list::Item> for ListItem {
    fn from(item: read::booking::list::Item) -> Self {
        Self {
            booking: item.booking.into(),
            hotel: HotelSummary {
                name: item.hotel_name,
            },
            room: RoomSummary {
                room_number: item.room_number,
                room_type: item.room_kind,
            },
        }
    }
}

/// Lists the caller's [`Booking`]s, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `FORBIDDEN` - the caller is not a customer;
/// - `INVALID_REQUEST` - the query parameters are invalid.
#[tracing::instrument(skip_all, fields(http.route = "GET /bookings"))]
pub async fn list(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> api::Result<Vec<ListItem>> {
    policy::list_bookings(ctx.caller())
        .ok()
        .map_err(AsError::into_error)?;
    let Query(ListParams { status }) = params?;

    let items = ctx
        .service()
        .execute(query::bookings::List::by(read::booking::list::Filter {
            user_id: ctx.caller().id,
            status,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Envelope::success(
        items.into_iter().map(Into::into).collect(),
    ))
}

/// Cancels the caller's [`Booking`].
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `FORBIDDEN` - the caller is not a customer;
/// - `INVALID_REQUEST` - the [`Booking`] ID is malformed;
/// - `BOOKING_NOT_FOUND` - the [`Booking`] doesn't exist;
/// - `FORBIDDEN` - the [`Booking`] is made by another user;
/// - `ALREADY_CANCELLED` - the [`Booking`] is cancelled already;
/// - `BOOKING_ALREADY_COMPLETED` - the stay is over;
/// - `CANCELLATION_DEADLINE_PASSED` - less than 24 hours left before the
///   check-in;
/// - `BOOKING_NOT_CANCELLABLE` - the [`Booking`] was changed concurrently.
#[tracing::instrument(
    skip_all,
    fields(http.route = "PUT /bookings/:booking_id/cancel"),
)]
pub async fn cancel(
    ctx: Context,
    booking_id: Result<Path<booking::Id>, PathRejection>,
) -> api::Result<Booking> {
    policy::require(ctx.caller(), user::Role::Customer)
        .ok()
        .map_err(AsError::into_error)?;
    let Path(booking_id) = booking_id?;

    let booking = ctx
        .service()
        .execute(command::CancelBooking {
            caller: ctx.caller(),
            booking_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Envelope::success(booking.into()))
}

define_error! {
    enum NotFoundError {
        #[code = "BOOKING_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Booking` does not exist"]
        Booking,

        #[code = "ROOM_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Room` does not exist"]
        Room,
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_CAPACITY"]
                #[status = BAD_REQUEST]
                #[message = "Guests exceed the `Room` maximum occupancy"]
                CapacityExceeded,

                #[code = "INVALID_DATES"]
                #[status = BAD_REQUEST]
                #[message = "Check-in is in the past or not before check-out"]
                InvalidDates,

                #[code = "ROOM_NOT_AVAILABLE"]
                #[status = BAD_REQUEST]
                #[message = "`Room` is booked for an overlapping period"]
                RoomNotAvailable,
            }
        }

        match self {
            Self::CapacityExceeded { .. } => {
                Some(Error::CapacityExceeded.into())
            }
            Self::CheckInInPast(_) | Self::InvalidPeriod(_) => {
                Some(Error::InvalidDates.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(r) => r.try_as_error(),
            Self::PriceOverflow(_) => {
                Some(crate::error::RequestError::Invalid.into())
            }
            Self::RoomNotAvailable(_) => Some(Error::RoomNotAvailable.into()),
            Self::RoomNotExists(_) => Some(NotFoundError::Room.into()),
        }
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use booking::NotCancellable as Reason;

        define_error! {
            enum Error {
                #[code = "ALREADY_CANCELLED"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` is cancelled already"]
                AlreadyCancelled,

                #[code = "BOOKING_ALREADY_COMPLETED"]
                #[status = BAD_REQUEST]
                #[message = "Stay of the `Booking` is over"]
                AlreadyCompleted,

                #[code = "CANCELLATION_DEADLINE_PASSED"]
                #[status = BAD_REQUEST]
                #[message = "Less than 24 hours left before the check-in"]
                DeadlinePassed,

                #[code = "BOOKING_NOT_CANCELLABLE"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` was changed concurrently"]
                Conflict,
            }
        }

        match self {
            Self::BookingNotExists(_) => Some(NotFoundError::Booking.into()),
            Self::Conflict(_) => Some(Error::Conflict.into()),
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(r) => r.try_as_error(),
            Self::NotCancellable(Reason::AlreadyCancelled) => {
                Some(Error::AlreadyCancelled.into())
            }
            Self::NotCancellable(Reason::AlreadyCompleted) => {
                Some(Error::AlreadyCompleted.into())
            }
            Self::NotCancellable(Reason::DeadlinePassed) => {
                Some(Error::DeadlinePassed.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;
    use service::{
        command::{cancel_booking, create_booking},
        domain::{booking, room, user},
        policy::Caller,
    };

    use crate::AsError as _;

    use super::{CreateRequest, ListParams};

    #[test]
    fn parses_booking_request() {
        let room_id = room::Id::new();
        let req: CreateRequest = serde_json::from_value(json!({
            "roomId": room_id,
            "checkInDate": "2030-06-01",
            "checkOutDate": "2030-06-03T00:00:00Z",
            "guests": 2,
        }))
        .unwrap();
        let caller = Caller {
            id: user::Id::new(),
            role: user::Role::Customer,
        };

        let cmd = req.into_command(caller).unwrap();
        assert_eq!(cmd.room_id, room_id);
        assert_eq!(cmd.check_out.to_string(), "2030-06-03");
        assert_eq!(cmd.guests.get(), 2);
    }

    #[test]
    fn rejects_zero_guests() {
        let req: CreateRequest = serde_json::from_value(json!({
            "roomId": room::Id::new(),
            "checkInDate": "2030-06-01",
            "checkOutDate": "2030-06-03",
            "guests": 0,
        }))
        .unwrap();
        let caller = Caller {
            id: user::Id::new(),
            role: user::Role::Customer,
        };

        let err = req.into_command(caller).unwrap_err();
        assert_eq!(err.code, "INVALID_REQUEST");
    }

    #[test]
    fn parses_status_filter() {
        let params: ListParams =
            serde_json::from_value(json!({"status": "cancelled"})).unwrap();
        assert_eq!(params.status, Some(booking::Status::Cancelled));

        let params: ListParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.status, None);
    }

    #[test]
    fn maps_booking_errors() {
        let err = create_booking::ExecutionError::RoomNotAvailable(
            room::Id::new(),
        )
        .into_error();
        assert_eq!(err.code, "ROOM_NOT_AVAILABLE");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        let err = create_booking::ExecutionError::RoomNotExists(room::Id::new())
            .into_error();
        assert_eq!(err.code, "ROOM_NOT_FOUND");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn maps_cancellation_errors() {
        for (reason, code) in [
            (booking::NotCancellable::AlreadyCancelled, "ALREADY_CANCELLED"),
            (
                booking::NotCancellable::AlreadyCompleted,
                "BOOKING_ALREADY_COMPLETED",
            ),
            (
                booking::NotCancellable::DeadlinePassed,
                "CANCELLATION_DEADLINE_PASSED",
            ),
        ] {
            let err = cancel_booking::ExecutionError::NotCancellable(reason)
                .into_error();
            assert_eq!(err.code, code);
        }

        let err = cancel_booking::ExecutionError::Conflict(booking::Id::new())
            .into_error();
        assert_eq!(err.code, "BOOKING_NOT_CANCELLABLE");
    }
}
