//! [`Room`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{hotel, room, Room},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `rooms` table, as [`from_row()`] expects them.
const COLUMNS: &str = "\
    id, hotel_id, number, kind, price, max_occupancy, created_at";

/// Maps the provided `rooms` [`Row`] into a [`Room`].
fn from_row(row: &Row) -> Room {
    Room {
        id: row.get("id"),
        hotel_id: row.get("hotel_id"),
        number: row.get("number"),
        kind: row.get("kind"),
        price: row.get("price"),
        max_occupancy: u16::try_from(row.get::<_, i16>("max_occupancy"))
            .ok()
            .and_then(room::Occupancy::new)
            .expect("`max_occupancy` out of range"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Room>, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1::UUID");
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<'n, C> Database<Select<By<Option<Room>, (hotel::Id, &'n room::Number)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, (hotel::Id, &'n room::Number)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (hotel_id, number) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms \
             WHERE hotel_id = $1::UUID \
               AND number = $2::VARCHAR",
        );
        Ok(self
            .query_opt(&sql, &[&hotel_id, &number])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Room>, hotel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Room>, hotel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let hotel_id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rooms \
             WHERE hotel_id = $1::UUID \
             ORDER BY number",
        );
        Ok(self
            .query(&sql, &[&hotel_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Room>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(room): Insert<Room>,
    ) -> Result<Self::Ok, Self::Err> {
        let Room {
            id,
            hotel_id,
            number,
            kind,
            price,
            max_occupancy,
            created_at,
        } = room;
        let max_occupancy = i16::try_from(max_occupancy.get())
            .expect("`max_occupancy` overflow");

        const SQL: &str = "\
            INSERT INTO rooms (\
                id, hotel_id, number, kind, \
                price, max_occupancy, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                $5::NUMERIC, $6::INT2, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &hotel_id,
                &number,
                &kind,
                &price,
                &max_occupancy,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Room, room::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Room, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: room::Id = by.into_inner();

        // Updating the row holds its lock until the transaction ends.
        const SQL: &str = "\
            INSERT INTO rooms_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
