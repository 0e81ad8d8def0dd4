//! [`Query`] collection related to a single [`Hotel`].

use common::operations::By;

use crate::domain::{hotel, Hotel, Room};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Hotel`] by its [`hotel::Id`].
pub type ById = DatabaseQuery<By<Option<Hotel>, hotel::Id>>;

/// Queries all the [`Room`]s of a [`Hotel`].
pub type Rooms = DatabaseQuery<By<Vec<Room>, hotel::Id>>;
