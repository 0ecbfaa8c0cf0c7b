//! `$select` projection

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::QueryError;
use super::schema::{Column, Record};
use super::value::Value;

/// Compiled `$select` clause
#[derive(Debug)]
pub enum Projection<R> {
    /// No selection given; records are returned whole
    Identity,
    /// Requested name (caller casing) paired with its resolved column
    Columns(Vec<(String, Column<R>)>),
}

impl<R> Projection<R> {
    pub fn is_identity(&self) -> bool {
        matches!(self, Projection::Identity)
    }

    /// Project one record. Returns `None` for the identity projection.
    pub fn project(&self, record: &R) -> Option<ProjectedRow> {
        match self {
            Projection::Identity => None,
            Projection::Columns(columns) => Some(ProjectedRow(
                columns
                    .iter()
                    .map(|(name, column)| (name.clone(), column.read(record)))
                    .collect(),
            )),
        }
    }
}

/// Ordered name/value pairs, serialized as a JSON object in request order
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow(pub Vec<(String, Value)>);

impl ProjectedRow {
    /// Case-insensitive lookup by column name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

impl Serialize for ProjectedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parse a comma-separated column list. Every name must resolve.
pub fn compile_select<R: Record>(input: &str) -> Result<Projection<R>, QueryError> {
    let schema = R::query_schema();
    let mut columns: Vec<(String, Column<R>)> = Vec::new();

    for name in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let column = *schema.resolve(name)?;
        if columns
            .iter()
            .any(|(seen, _)| seen.eq_ignore_ascii_case(name))
        {
            continue;
        }
        columns.push((name.to_string(), column));
    }

    if columns.is_empty() {
        return Ok(Projection::Identity);
    }
    Ok(Projection::Columns(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::schema::fixtures::{Person, person};

    #[test]
    fn test_select_keeps_caller_casing_and_order() {
        let projection = compile_select::<Person>("Price, NAME").unwrap();
        let record = Person {
            price: Some(2.5),
            ..person(7, "Ann")
        };
        let row = projection.project(&record).unwrap();
        assert_eq!(
            row.0,
            vec![
                ("Price".to_string(), Value::Float(2.5)),
                ("NAME".to_string(), Value::Text("Ann".to_string())),
            ]
        );
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Price":2.5,"NAME":"Ann"}"#);
    }

    #[test]
    fn test_select_missing_value_is_null() {
        let projection = compile_select::<Person>("city").unwrap();
        let row = projection.project(&person(1, "Ann")).unwrap();
        assert_eq!(row.get("city"), Some(&Value::Null));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"city":null}"#);
    }

    #[test]
    fn test_select_wire_name() {
        let projection = compile_select::<Person>("full_name").unwrap();
        let row = projection.project(&person(1, "Ann")).unwrap();
        assert_eq!(row.get("full_name"), Some(&Value::Text("Ann".to_string())));
    }

    #[test]
    fn test_row_lookup_ignores_case() {
        let projection = compile_select::<Person>("NAME").unwrap();
        let row = projection.project(&person(1, "Ann")).unwrap();
        assert_eq!(row.get("name"), Some(&Value::Text("Ann".to_string())));
        assert_eq!(row.get("Name"), row.get("NAME"));
        assert_eq!(row.0[0].0, "NAME");
    }

    #[test]
    fn test_select_duplicates_keep_first() {
        let projection = compile_select::<Person>("name, id, NAME").unwrap();
        let row = projection.project(&person(1, "Ann")).unwrap();
        let names: Vec<_> = row.0.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["name", "id"]);
    }

    #[test]
    fn test_select_empty_is_identity() {
        assert!(compile_select::<Person>("").unwrap().is_identity());
        assert!(compile_select::<Person>(" , ").unwrap().is_identity());
        assert!(
            compile_select::<Person>("")
                .unwrap()
                .project(&person(1, "Ann"))
                .is_none()
        );
    }

    #[test]
    fn test_select_unknown_column_fails_fast() {
        let err = compile_select::<Person>("name, colour, id").unwrap_err();
        assert_eq!(err, QueryError::UnknownColumn("colour".to_string()));
    }
}
