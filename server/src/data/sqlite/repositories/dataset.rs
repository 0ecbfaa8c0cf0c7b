//! Generic dataset repository for SQLite operations
//!
//! SQL is derived from the record's column schema: every column except
//! `id` is written, in declaration order, under its storage name.

use futures::future;
use futures::TryStreamExt;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::{Executor, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::traits::Dataset;
use crate::query::Value;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

const ID_COLUMN: &str = "id";

fn data_columns<R: Dataset>() -> impl Iterator<Item = &'static crate::query::Column<R>> {
    R::query_schema()
        .columns()
        .iter()
        .filter(|c| c.storage_name() != ID_COLUMN)
}

fn insert_sql<R: Dataset>() -> String {
    let columns: Vec<&str> = data_columns::<R>().map(|c| c.storage_name()).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        columns.join(", "),
        placeholders
    )
}

fn update_sql<R: Dataset>() -> String {
    let assignments: Vec<String> = data_columns::<R>()
        .map(|c| format!("{} = ?", c.storage_name()))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        R::TABLE,
        assignments.join(", "),
        ID_COLUMN
    )
}

fn bind_value(query: SqliteQuery<'_>, value: Value) -> SqliteQuery<'_> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Text(s) => query.bind(s),
        Value::Integer(i) => query.bind(i),
        Value::Float(f) => query.bind(f),
        Value::Boolean(b) => query.bind(b),
        Value::DateTime(dt) => query.bind(dt),
    }
}

fn bind_record<'q, R: Dataset>(mut query: SqliteQuery<'q>, record: &R) -> SqliteQuery<'q> {
    for column in data_columns::<R>() {
        query = bind_value(query, column.read(record));
    }
    query
}

async fn insert_with<'e, R, E>(executor: E, sql: &str, record: &R) -> Result<i64, SqliteError>
where
    R: Dataset,
    E: Executor<'e, Database = Sqlite>,
{
    let result = bind_record(sqlx::query(sql), record)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

async fn update_with<'e, R, E>(
    executor: E,
    sql: &str,
    id: i64,
    record: &R,
) -> Result<bool, SqliteError>
where
    R: Dataset,
    E: Executor<'e, Database = Sqlite>,
{
    let result = bind_record(sqlx::query(sql), record)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Load every row of the dataset, ordered by id
pub async fn list_all<R: Dataset>(pool: &SqlitePool) -> Result<Vec<R>, SqliteError> {
    list_matching(pool, |_: &R| true).await
}

/// Stream the dataset in id order, keeping only rows `keep` accepts.
/// Rejected rows are dropped as they are decoded.
pub async fn list_matching<R, F>(pool: &SqlitePool, keep: F) -> Result<Vec<R>, SqliteError>
where
    R: Dataset,
    F: Fn(&R) -> bool,
{
    let sql = format!("SELECT * FROM {} ORDER BY {}", R::TABLE, ID_COLUMN);
    let rows = sqlx::query_as::<_, R>(&sql)
        .fetch(pool)
        .try_filter(|row| future::ready(keep(row)))
        .try_collect::<Vec<R>>()
        .await?;
    Ok(rows)
}

pub async fn get<R: Dataset>(pool: &SqlitePool, id: i64) -> Result<Option<R>, SqliteError> {
    let sql = format!("SELECT * FROM {} WHERE {} = ?", R::TABLE, ID_COLUMN);
    let row = sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert one record. Any `id` on the input is ignored; the stored record
/// with its assigned id is returned.
pub async fn insert<R: Dataset>(pool: &SqlitePool, record: &R) -> Result<R, SqliteError> {
    let id = insert_with(pool, &insert_sql::<R>(), record).await?;

    let mut stored = record.clone();
    stored.set_id(id);
    tracing::debug!(dataset = R::NAME, id, "Inserted record");
    Ok(stored)
}

/// Insert many records in one transaction. Nothing is written if any insert fails.
pub async fn insert_batch<R: Dataset>(
    pool: &SqlitePool,
    records: &[R],
) -> Result<Vec<R>, SqliteError> {
    let sql = insert_sql::<R>();
    let mut tx = pool.begin().await?;
    let mut stored = Vec::with_capacity(records.len());

    for record in records {
        let id = insert_with(&mut *tx, &sql, record).await?;
        let mut row = record.clone();
        row.set_id(id);
        stored.push(row);
    }

    tx.commit().await?;
    tracing::debug!(dataset = R::NAME, count = stored.len(), "Inserted batch");
    Ok(stored)
}

/// Replace every non-key field of an existing record.
/// Returns false if no record has that id.
pub async fn update<R: Dataset>(
    pool: &SqlitePool,
    id: i64,
    record: &R,
) -> Result<bool, SqliteError> {
    let updated = update_with(pool, &update_sql::<R>(), id, record).await?;
    if updated {
        tracing::debug!(dataset = R::NAME, id, "Updated record");
    }
    Ok(updated)
}

/// Counts from an upsert batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Update records whose non-zero id exists, insert the rest, in one transaction
pub async fn upsert_batch<R: Dataset>(
    pool: &SqlitePool,
    records: &[R],
) -> Result<UpsertSummary, SqliteError> {
    let insert = insert_sql::<R>();
    let update = update_sql::<R>();
    let mut tx = pool.begin().await?;
    let mut summary = UpsertSummary::default();

    for record in records {
        let id = record.id();
        if id != 0 && update_with(&mut *tx, &update, id, record).await? {
            summary.updated += 1;
        } else {
            insert_with(&mut *tx, &insert, record).await?;
            summary.inserted += 1;
        }
    }

    tx.commit().await?;
    tracing::debug!(
        dataset = R::NAME,
        inserted = summary.inserted,
        updated = summary.updated,
        "Upserted batch"
    );
    Ok(summary)
}

/// Returns false if no record has that id
pub async fn delete<R: Dataset>(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let sql = format!("DELETE FROM {} WHERE {} = ?", R::TABLE, ID_COLUMN);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::debug!(dataset = R::NAME, id, "Deleted record");
    }
    Ok(deleted)
}
