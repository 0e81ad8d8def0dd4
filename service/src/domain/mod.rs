//! Domain definitions.

pub mod booking;
pub mod hotel;
pub mod review;
pub mod room;
pub mod user;

pub use self::{
    booking::Booking, hotel::Hotel, review::Review, room::Room, user::User,
};
