//! HTTP API definitions.

pub mod booking;
pub mod hotel;
pub mod review;
pub mod user;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::{
    error::{Code, RequestError},
    Error,
};

/// Builds the [`Router`] of all the HTTP API endpoints.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/auth/signup", post(user::signup))
        .route("/auth/login", post(user::login))
        .route("/hotels", post(hotel::create).get(hotel::list))
        .route("/hotels/:hotel_id", get(hotel::details))
        .route("/hotels/:hotel_id/rooms", post(hotel::add_room))
        .route("/bookings", post(booking::create).get(booking::list))
        .route("/bookings/:booking_id/cancel", put(booking::cancel))
        .route("/reviews", post(review::create))
}

/// Envelope every HTTP API response body is wrapped into.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T> {
    /// Indicator whether the request has succeeded.
    pub success: bool,

    /// Payload of a succeeded request.
    pub data: Option<T>,

    /// [`Code`] of the [`Error`] a request has failed with.
    pub error: Option<Code>,
}

impl<T> Envelope<T> {
    /// Wraps the provided `data` of a succeeded request.
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wraps the provided [`Error`] `code` of a failed request.
    #[must_use]
    pub const fn failure(code: Code) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(code),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Result of an HTTP API endpoint.
pub type Result<T> = std::result::Result<Envelope<T>, Error>;

/// Result of an HTTP API endpoint creating a new resource.
pub type Created<T> =
    std::result::Result<(http::StatusCode, Envelope<T>), Error>;

/// Wraps the provided `data` of a newly created resource.
#[must_use]
pub const fn created<T>(data: T) -> (http::StatusCode, Envelope<T>) {
    (http::StatusCode::CREATED, Envelope::success(data))
}

/// Unwraps the provided request value, if it has been validated successfully.
///
/// # Errors
///
/// With an `INVALID_REQUEST` [`Error`] if the value is invalid.
pub fn valid<T>(value: Option<T>) -> std::result::Result<T, Error> {
    value.ok_or_else(|| RequestError::Invalid.into())
}
