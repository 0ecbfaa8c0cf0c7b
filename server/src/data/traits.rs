//! Dataset trait shared by the persistence and API layers

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;
use utoipa::ToSchema;

use crate::query::Record;

/// A record type backed by one SQLite table with an integer `id` key.
///
/// Storage columns and their order come from the record's query schema,
/// so inserts and updates need no per-type SQL.
pub trait Dataset:
    Record + Clone + Serialize + DeserializeOwned + ToSchema + for<'r> FromRow<'r, SqliteRow> + Unpin
{
    /// Table name, also used as the route prefix
    const TABLE: &'static str;
    /// Human-readable name for messages and logs
    const NAME: &'static str;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}
