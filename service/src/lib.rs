//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod policy;
pub mod query;
pub mod read;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lifetime of a newly created [`domain::user::Session`].
    pub session_ttl: Duration,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub const fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub const fn database(&self) -> &Db {
        &self.database
    }
}

#[cfg(test)]
mod test_util {
    //! Fixtures shared by the [`Command`] and [`Query`] tests.

    use std::time::Duration;

    use common::{Date, DateTime, Money};

    use crate::{
        domain::{hotel, room, user, Hotel, Room, User},
        infra::database::Memory,
        policy::Caller,
        Config, Service,
    };

    /// Returns a [`Service`] over an empty [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        let secret = b"test-secret";
        Service::new(
            Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
                session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            },
            Memory::default(),
        )
    }

    /// Returns the same [`Service`] reading stale data.
    pub(crate) fn stale(svc: &Service<Memory>) -> Service<Memory> {
        Service::new(svc.config().clone(), svc.database().stale())
    }

    /// Returns a [`Caller`] with a random ID and the provided [`user::Role`].
    pub(crate) fn caller(role: user::Role) -> Caller {
        Caller {
            id: user::Id::new(),
            role,
        }
    }

    /// Builds a new [`User`] with the provided `email` and `role`.
    pub(crate) fn user(email: &str, role: user::Role) -> User {
        User {
            id: user::Id::new(),
            name: user::Name::new("Guest Name").unwrap(),
            email: user::Email::new(email).unwrap(),
            password_hash: user::PasswordHash::new(
                &user::Password::new("password").unwrap(),
            ),
            role,
            phone: None,
            created_at: DateTime::now().coerce(),
        }
    }

    /// Builds a new [`Hotel`] owned by the provided `owner`.
    pub(crate) fn hotel(owner: &Caller) -> Hotel {
        Hotel {
            id: hotel::Id::new(),
            owner_id: owner.id,
            name: hotel::Name::new("Grand Hotel").unwrap(),
            description: None,
            city: hotel::City::new("Vienna").unwrap(),
            country: hotel::Country::new("Austria").unwrap(),
            amenities: vec![],
            rating: hotel::Rating::NONE,
            created_at: DateTime::now().coerce(),
        }
    }

    /// Builds a new [`Room`] of the provided [`Hotel`].
    pub(crate) fn room(hotel: &Hotel, number: &str, price: u32) -> Room {
        Room {
            id: room::Id::new(),
            hotel_id: hotel.id,
            number: room::Number::new(number).unwrap(),
            kind: room::Kind::new("double").unwrap(),
            price: room::Price::new(Money::new(price.into()).unwrap())
                .unwrap(),
            max_occupancy: room::Occupancy::new(2).unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    /// Returns the [`Date`] shifted from today by the provided `days`.
    pub(crate) fn day(days: i64) -> Date {
        Date::today().add_days(days).unwrap()
    }
}
