//! Per-record-type column registry and name resolution
//!
//! Each queryable record type builds its [`Schema`] once (typically in a
//! `OnceLock`) from a list of [`Column`] descriptors. Lookups are
//! case-insensitive and check, in order, the logical name, the wire
//! (serialized) name and the storage column name.

use rustc_hash::FxHashMap;

use super::error::QueryError;
use super::value::{Value, ValueKind};

/// A record type that can be filtered, sorted, projected and grouped
pub trait Record: Sized + Send + Sync + 'static {
    fn query_schema() -> &'static Schema<Self>;
}

/// Typed description of one field of `R`
pub struct Column<R> {
    pub name: &'static str,
    pub wire_name: Option<&'static str>,
    pub column_name: Option<&'static str>,
    pub kind: ValueKind,
    pub nullable: bool,
    pub accessor: fn(&R) -> Value,
}

// Manual impls: derive would add an unnecessary `R: Clone` bound
impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("column_name", &self.column_name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl<R> Column<R> {
    /// Nullable column whose wire and storage names equal `name`
    pub fn new(name: &'static str, kind: ValueKind, accessor: fn(&R) -> Value) -> Self {
        Self {
            name,
            wire_name: None,
            column_name: None,
            kind,
            nullable: true,
            accessor,
        }
    }

    pub fn text(name: &'static str, accessor: fn(&R) -> Value) -> Self {
        Self::new(name, ValueKind::Text, accessor)
    }

    pub fn integer(name: &'static str, accessor: fn(&R) -> Value) -> Self {
        Self::new(name, ValueKind::Integer, accessor)
    }

    pub fn float(name: &'static str, accessor: fn(&R) -> Value) -> Self {
        Self::new(name, ValueKind::Float, accessor)
    }

    pub fn boolean(name: &'static str, accessor: fn(&R) -> Value) -> Self {
        Self::new(name, ValueKind::Boolean, accessor)
    }

    pub fn datetime(name: &'static str, accessor: fn(&R) -> Value) -> Self {
        Self::new(name, ValueKind::DateTime, accessor)
    }

    pub fn wire(mut self, wire_name: &'static str) -> Self {
        self.wire_name = Some(wire_name);
        self
    }

    pub fn stored_as(mut self, column_name: &'static str) -> Self {
        self.column_name = Some(column_name);
        self
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Name used on the wire (JSON)
    pub fn wire_name(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }

    /// Name of the backing storage column
    pub fn storage_name(&self) -> &'static str {
        self.column_name.or(self.wire_name).unwrap_or(self.name)
    }

    pub fn read(&self, record: &R) -> Value {
        (self.accessor)(record)
    }
}

/// Column registry for one record type
pub struct Schema<R> {
    columns: Vec<Column<R>>,
    by_name: FxHashMap<String, usize>,
    by_wire_name: FxHashMap<String, usize>,
    by_column_name: FxHashMap<String, usize>,
}

impl<R> Schema<R> {
    pub fn new(columns: Vec<Column<R>>) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_wire_name = FxHashMap::default();
        let mut by_column_name = FxHashMap::default();

        for (idx, column) in columns.iter().enumerate() {
            // First declaration wins on duplicate keys
            by_name.entry(column.name.to_lowercase()).or_insert(idx);
            if let Some(wire) = column.wire_name {
                by_wire_name.entry(wire.to_lowercase()).or_insert(idx);
            }
            if let Some(stored) = column.column_name {
                by_column_name.entry(stored.to_lowercase()).or_insert(idx);
            }
        }

        Self {
            columns,
            by_name,
            by_wire_name,
            by_column_name,
        }
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Resolve a caller-supplied column name
    pub fn resolve(&self, name: &str) -> Result<&Column<R>, QueryError> {
        let key = name.trim().to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_wire_name.get(&key))
            .or_else(|| self.by_column_name.get(&key))
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| QueryError::UnknownColumn(name.trim().to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small record type shared by the query module tests

    use std::sync::OnceLock;

    use chrono::NaiveDateTime;
    use serde::Serialize;

    use super::{Column, Record, Schema};

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    pub struct Person {
        pub id: i64,
        pub name: Option<String>,
        pub city: Option<String>,
        pub year: Option<String>,
        pub price: Option<f64>,
        pub score: Option<i64>,
        pub active: Option<bool>,
        pub joined: Option<NaiveDateTime>,
    }

    impl Record for Person {
        fn query_schema() -> &'static Schema<Self> {
            static SCHEMA: OnceLock<Schema<Person>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                Schema::new(vec![
                    Column::integer("id", |r: &Person| r.id.into()).required(),
                    Column::text("name", |r: &Person| r.name.clone().into()).wire("full_name"),
                    Column::text("city", |r: &Person| r.city.clone().into())
                        .stored_as("home_city"),
                    Column::text("year", |r: &Person| r.year.clone().into()),
                    Column::float("price", |r: &Person| r.price.into()),
                    Column::integer("score", |r: &Person| r.score.into()),
                    Column::boolean("active", |r: &Person| r.active.into()),
                    Column::datetime("joined", |r: &Person| r.joined.into()),
                ])
            })
        }
    }

    pub fn person(id: i64, name: &str) -> Person {
        Person {
            id,
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::Person;
    use super::*;

    #[test]
    fn test_resolve_logical_name_case_insensitive() {
        let schema = Person::query_schema();
        assert_eq!(schema.resolve("NAME").unwrap().name, "name");
        assert_eq!(schema.resolve("Price").unwrap().name, "price");
    }

    #[test]
    fn test_resolve_wire_name() {
        let column = Person::query_schema().resolve("Full_Name").unwrap();
        assert_eq!(column.name, "name");
        assert_eq!(column.wire_name(), "full_name");
    }

    #[test]
    fn test_resolve_storage_name() {
        let column = Person::query_schema().resolve("home_city").unwrap();
        assert_eq!(column.name, "city");
        assert_eq!(column.storage_name(), "home_city");
    }

    #[test]
    fn test_resolve_unknown_column() {
        let err = Person::query_schema().resolve("colour").unwrap_err();
        assert_eq!(err, QueryError::UnknownColumn("colour".to_string()));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let schema = Person::query_schema();
        let first = schema.resolve("score").unwrap().name;
        for _ in 0..10 {
            assert_eq!(schema.resolve("SCORE").unwrap().name, first);
        }
    }

    #[test]
    fn test_logical_name_wins_over_wire_name() {
        struct Pair {
            a: Option<String>,
            b: Option<String>,
        }
        let schema: Schema<Pair> = Schema::new(vec![
            Column::text("alpha", |r: &Pair| r.a.clone().into()).wire("beta"),
            Column::text("beta", |r: &Pair| r.b.clone().into()),
        ]);
        let row = Pair {
            a: Some("a".into()),
            b: Some("b".into()),
        };
        let column = schema.resolve("beta").unwrap();
        assert_eq!(column.name, "beta");
        assert_eq!(column.read(&row), Value::Text("b".into()));
    }

    #[test]
    fn test_required_flag() {
        let schema = Person::query_schema();
        assert!(!schema.resolve("id").unwrap().nullable);
        assert!(schema.resolve("name").unwrap().nullable);
    }
}
