//! [`Query`] collection related to the multiple [`Booking`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Booking, Query};

use super::DatabaseQuery;

/// Queries a list of [`Booking`]s made by a [`User`], newest first.
///
/// [`User`]: crate::domain::User
pub type List = DatabaseQuery<
    By<Vec<read::booking::list::Item>, read::booking::list::Filter>,
>;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::{CancelBooking, Command as _, CreateBooking},
        domain::{booking, user::Role},
        infra::Database as _,
        read::booking::list::Filter,
        test_util,
    };

    use super::List;

    #[tokio::test]
    async fn lists_own_bookings_newest_first() {
        let svc = test_util::service();
        let hotel = test_util::hotel(&test_util::caller(Role::Owner));
        let room = test_util::room(&hotel, "101", 100);
        svc.database().execute(Insert(hotel.clone())).await.unwrap();
        svc.database().execute(Insert(room.clone())).await.unwrap();
        let guest = test_util::caller(Role::Customer);
        let other = test_util::caller(Role::Customer);

        let mut made = vec![];
        for (caller, from) in [(guest, 10), (other, 20), (guest, 30)] {
            made.push(
                svc.execute(CreateBooking {
                    caller,
                    room_id: room.id,
                    check_in: test_util::day(from),
                    check_out: test_util::day(from + 2),
                    guests: booking::Guests::new(1).unwrap(),
                })
                .await
                .unwrap(),
            );
        }
        _ = svc
            .execute(CancelBooking {
                caller: guest,
                booking_id: made[0].id,
            })
            .await
            .unwrap();

        let all = svc
            .execute(List::by(Filter {
                user_id: guest.id,
                status: None,
            }))
            .await
            .unwrap();
        let ids = all.iter().map(|i| i.booking.id).collect::<Vec<_>>();
        assert_eq!(ids, [made[2].id, made[0].id]);
        assert_eq!(all[0].hotel_name, hotel.name);
        assert_eq!(all[0].room_number, room.number);
        assert_eq!(all[0].room_kind, room.kind);

        let cancelled = svc
            .execute(List::by(Filter {
                user_id: guest.id,
                status: Some(booking::Status::Cancelled),
            }))
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].booking.id, made[0].id);
    }
}
