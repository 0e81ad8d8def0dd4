//! [`Hotel`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{hotel, Hotel},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `hotels` table, as [`from_row()`] expects them.
const COLUMNS: &str = "\
    h.id, h.owner_id, h.name, h.description, h.city, h.country, \
    h.amenities, h.rating, h.total_reviews, h.created_at";

/// Maps the provided `hotels` [`Row`] into a [`Hotel`].
fn from_row(row: &Row) -> Hotel {
    Hotel {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        city: row.get("city"),
        country: row.get("country"),
        amenities: row.get("amenities"),
        rating: hotel::Rating {
            average: row.get("rating"),
            total_reviews: u32::try_from(row.get::<_, i64>("total_reviews"))
                .expect("`total_reviews` overflow"),
        },
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Hotel>, hotel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Hotel>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Hotel>, hotel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM hotels AS h WHERE h.id = $1::UUID");
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Hotel>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Hotel>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(hotel): Insert<Hotel>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(hotel)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Hotel>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(hotel): Update<Hotel>,
    ) -> Result<Self::Ok, Self::Err> {
        let Hotel {
            id,
            owner_id,
            name,
            description,
            city,
            country,
            amenities,
            rating,
            created_at,
        } = hotel;
        let total_reviews = i64::from(rating.total_reviews);

        const SQL: &str = "\
            INSERT INTO hotels (\
                id, owner_id, name, description, \
                city, country, amenities, \
                rating, total_reviews, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::TEXT, \
                $5::VARCHAR, $6::VARCHAR, $7::TEXT[], \
                $8::NUMERIC, $9::INT8, \
                $10::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                city = EXCLUDED.city, \
                country = EXCLUDED.country, \
                amenities = EXCLUDED.amenities, \
                rating = EXCLUDED.rating, \
                total_reviews = EXCLUDED.total_reviews";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &name,
                &description,
                &city,
                &country,
                &amenities,
                &rating.average,
                &total_reviews,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Hotel, hotel::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Hotel, hotel::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: hotel::Id = by.into_inner();

        // Updating the row holds its lock until the transaction ends.
        const SQL: &str = "\
            INSERT INTO hotels_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<Vec<read::hotel::list::Item>, read::hotel::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::hotel::list::Item>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::hotel::list::Item>, read::hotel::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::hotel::list::Filter {
            city,
            country,
            min_price,
            max_price,
            min_rating,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];

        if let Some(city) = &city {
            ps.push(city);
            conditions.push(format!("h.city = ${}::VARCHAR", ps.len()));
        }
        if let Some(country) = &country {
            ps.push(country);
            conditions.push(format!("h.country = ${}::VARCHAR", ps.len()));
        }
        if let Some(rating) = &min_rating {
            ps.push(rating);
            conditions.push(format!("h.rating >= ${}::NUMERIC", ps.len()));
        }
        if min_price.is_some() || max_price.is_some() {
            let mut bounds = String::new();
            if let Some(min) = &min_price {
                ps.push(min);
                bounds.push_str(&format!(
                    " AND r.price >= ${}::NUMERIC",
                    ps.len(),
                ));
            }
            if let Some(max) = &max_price {
                ps.push(max);
                bounds.push_str(&format!(
                    " AND r.price <= ${}::NUMERIC",
                    ps.len(),
                ));
            }
            conditions.push(format!(
                "EXISTS (\
                    SELECT 1 FROM rooms AS r \
                    WHERE r.hotel_id = h.id{bounds}\
                )",
            ));
        }
        let filtering = conditions
            .iter()
            .map(|c| format!("AND {c} "))
            .collect::<String>();

        let sql = format!(
            "SELECT {COLUMNS}, \
                    (SELECT MIN(r.price) \
                     FROM rooms AS r \
                     WHERE r.hotel_id = h.id) AS min_price \
             FROM hotels AS h \
             WHERE TRUE {filtering}\
             ORDER BY h.created_at DESC, h.id",
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| read::hotel::list::Item {
                hotel: from_row(row),
                min_price: row.get("min_price"),
            })
            .collect())
    }
}
