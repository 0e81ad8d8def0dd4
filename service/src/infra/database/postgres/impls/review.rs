//! [`Review`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{booking, review, user, Review},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Review>, (user::Id, booking::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Review>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Review>, (user::Id, booking::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, booking_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, booking_id, hotel_id, \
                   score, comment, created_at \
            FROM reviews \
            WHERE user_id = $1::UUID \
              AND booking_id = $2::UUID";
        Ok(self
            .query_opt(SQL, &[&user_id, &booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Review {
                id: row.get("id"),
                user_id: row.get("user_id"),
                booking_id: row.get("booking_id"),
                hotel_id: row.get("hotel_id"),
                score: u8::try_from(row.get::<_, i16>("score"))
                    .ok()
                    .and_then(review::Score::new)
                    .expect("`score` out of range"),
                comment: row.get("comment"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Review>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(review): Insert<Review>,
    ) -> Result<Self::Ok, Self::Err> {
        let Review {
            id,
            user_id,
            booking_id,
            hotel_id,
            score,
            comment,
            created_at,
        } = review;
        let score = i16::from(score.get());

        const SQL: &str = "\
            INSERT INTO reviews (\
                id, user_id, booking_id, hotel_id, \
                score, comment, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::INT2, $6::TEXT, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &booking_id,
                &hotel_id,
                &score,
                &comment,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
