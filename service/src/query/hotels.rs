//! [`Query`] collection related to the multiple [`Hotel`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Hotel, Query};

use super::DatabaseQuery;

/// Queries a list of [`Hotel`]s matching a [`read::hotel::list::Filter`].
pub type List = DatabaseQuery<
    By<Vec<read::hotel::list::Item>, read::hotel::list::Filter>,
>;
