//! [`Booking`]-related read definitions.

#[cfg(doc)]
use crate::domain::Booking;

pub mod list {
    //! [`Booking`] list definitions.

    use crate::domain::{booking, hotel, room, user, Booking};
    #[cfg(doc)]
    use crate::domain::{Hotel, Room, User};

    /// Filter of a [`Booking`] list.
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the [`User`] who made the [`Booking`]s.
        pub user_id: user::Id,

        /// [`booking::Status`] of the [`Booking`]s, if any.
        pub status: Option<booking::Status>,
    }

    /// Item of a [`Booking`] list, newest first.
    #[derive(Clone, Debug)]
    pub struct Item {
        /// Listed [`Booking`].
        pub booking: Booking,

        /// [`hotel::Name`] of the booked [`Hotel`].
        pub hotel_name: hotel::Name,

        /// [`room::Number`] of the booked [`Room`].
        pub room_number: room::Number,

        /// [`room::Kind`] of the booked [`Room`].
        pub room_kind: room::Kind,
    }
}
