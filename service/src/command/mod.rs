//! [`Command`] definition.

pub mod authorize_user_session;
pub mod cancel_booking;
pub mod create_booking;
pub mod create_hotel;
pub mod create_review;
pub mod create_room;
pub mod create_user;
pub mod create_user_session;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    cancel_booking::CancelBooking, create_booking::CreateBooking,
    create_hotel::CreateHotel, create_review::CreateReview,
    create_room::CreateRoom, create_user::CreateUser,
    create_user_session::CreateUserSession,
};
