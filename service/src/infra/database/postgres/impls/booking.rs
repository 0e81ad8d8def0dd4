//! [`Booking`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, room, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `bookings` table, as [`from_row()`] expects them.
const COLUMNS: &str = "\
    b.id, b.user_id, b.room_id, b.hotel_id, \
    b.check_in, b.check_out, b.guests, \
    b.total_price, b.status, \
    b.created_at, b.cancelled_at";

/// Maps the provided `bookings` [`Row`] into a [`Booking`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        room_id: row.get("room_id"),
        hotel_id: row.get("hotel_id"),
        period: booking::Period::new(row.get("check_in"), row.get("check_out"))
            .expect("`CHECK (check_out > check_in)` constraint"),
        guests: u16::try_from(row.get::<_, i16>("guests"))
            .ok()
            .and_then(booking::Guests::new)
            .expect("`guests` out of range"),
        total_price: row.get("total_price"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        cancelled_at: row.get("cancelled_at"),
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM bookings AS b WHERE b.id = $1::UUID");
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Booking>, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let room_id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings AS b \
             WHERE b.room_id = $1::UUID \
             ORDER BY b.check_in",
        );
        Ok(self
            .query(&sql, &[&room_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            user_id,
            room_id,
            hotel_id,
            period,
            guests,
            total_price,
            status,
            created_at,
            cancelled_at,
        } = booking;
        let guests = i16::try_from(guests.get()).expect("`guests` overflow");

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, user_id, room_id, hotel_id, \
                check_in, check_out, guests, \
                total_price, status, \
                created_at, cancelled_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::DATE, $6::DATE, $7::INT2, \
                $8::NUMERIC, $9::INT2, \
                $10::TIMESTAMPTZ, $11::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &room_id,
                &hotel_id,
                &period.check_in(),
                &period.check_out(),
                &guests,
                &total_price,
                &status,
                &created_at,
                &cancelled_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<booking::Transition>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<booking::Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking::Transition {
            id,
            expected,
            status,
            cancelled_at,
        } = transition;

        const SQL: &str = "\
            UPDATE bookings \
            SET status = $3::INT2, \
                cancelled_at = $4::TIMESTAMPTZ \
            WHERE id = $1::UUID \
              AND status = $2::INT2";
        self.exec(SQL, &[&id, &expected, &status, &cancelled_at])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected == 1)
    }
}

impl<C>
    Database<
        Select<By<Vec<read::booking::list::Item>, read::booking::list::Filter>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::booking::list::Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::booking::list::Item>, read::booking::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::list::Filter { user_id, status } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS}, \
                    h.name AS hotel_name, \
                    r.number AS room_number, r.kind AS room_kind \
             FROM bookings AS b \
             INNER JOIN hotels AS h ON h.id = b.hotel_id \
             INNER JOIN rooms AS r ON r.id = b.room_id \
             WHERE b.user_id = $1::UUID \
               AND ($2::INT2 IS NULL OR b.status = $2::INT2) \
             ORDER BY b.created_at DESC, b.id",
        );
        Ok(self
            .query(&sql, &[&user_id, &status])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| read::booking::list::Item {
                booking: from_row(row),
                hotel_name: row.get("hotel_name"),
                room_number: row.get("room_number"),
                room_kind: row.get("room_kind"),
            })
            .collect())
    }
}
