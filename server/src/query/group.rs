//! `$apply=groupby((field))` aggregation

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::QueryError;
use super::schema::{Column, Record};
use super::value::Value;

const EXPECTED_SHAPE: &str = "expected groupby((<column>))";

/// Compiled `groupby` transformation
#[derive(Debug)]
pub struct GroupBy<R> {
    column: Column<R>,
    field: String,
}

impl<R> GroupBy<R> {
    /// Output field name, as the caller spelled it
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Count records per distinct key, in first-seen key order
    pub fn aggregate<'a, I>(&self, records: I) -> Vec<Group>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        let mut index: FxHashMap<GroupKey, usize> = FxHashMap::default();
        let mut groups: Vec<Group> = Vec::new();

        for record in records {
            let value = self.column.read(record);
            let slot = *index.entry(GroupKey::from(&value)).or_insert_with(|| {
                groups.push(Group {
                    field: self.field.clone(),
                    key: value,
                    count: 0,
                });
                groups.len() - 1
            });
            groups[slot].count += 1;
        }
        groups
    }
}

/// One output row of a grouping
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub field: String,
    pub key: Value,
    pub count: usize,
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.field, &self.key)?;
        map.serialize_entry("count", &self.count)?;
        map.end()
    }
}

/// Hashable identity of a [`Value`]; floats compare by bit pattern
#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Null,
    Text(String),
    Integer(i64),
    Float(u64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl From<&Value> for GroupKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => GroupKey::Null,
            Value::Text(s) => GroupKey::Text(s.clone()),
            Value::Integer(i) => GroupKey::Integer(*i),
            Value::Float(f) => GroupKey::Float(f.to_bits()),
            Value::Boolean(b) => GroupKey::Boolean(*b),
            Value::DateTime(dt) => GroupKey::DateTime(*dt),
        }
    }
}

fn transformation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*\((.*)\)\s*$").expect("Invalid regex"))
}

fn group_arg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\(\s*([\p{Alphabetic}_$][\w$]*)\s*\)\s*$").expect("Invalid regex"))
}

/// Parse an `$apply` value of the form `groupby((column))`
pub fn compile_group_by<R: Record>(input: &str) -> Result<GroupBy<R>, QueryError> {
    let caps = transformation_regex()
        .captures(input)
        .ok_or_else(|| QueryError::syntax(EXPECTED_SHAPE))?;

    let name = &caps[1];
    if !name.eq_ignore_ascii_case("groupby") {
        return Err(QueryError::UnsupportedFunction(name.to_string()));
    }

    let field = group_arg_regex()
        .captures(&caps[2])
        .map(|c| c[1].to_string())
        .ok_or_else(|| QueryError::syntax(EXPECTED_SHAPE))?;

    let column = *R::query_schema().resolve(&field)?;
    Ok(GroupBy { column, field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::schema::fixtures::Person;

    fn with_year(id: i64, year: Option<&str>) -> Person {
        Person {
            id,
            year: year.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_groupby_counts_by_requested_name() {
        let records = vec![
            with_year(1, Some("2020")),
            with_year(2, Some("2020")),
            with_year(3, Some("2021")),
        ];
        let group_by = compile_group_by::<Person>("groupby((year))").unwrap();
        let groups = group_by.aggregate(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(
            serde_json::to_value(&groups).unwrap(),
            serde_json::json!([
                {"year": "2020", "count": 2},
                {"year": "2021", "count": 1},
            ])
        );
    }

    #[test]
    fn test_groupby_keeps_caller_casing() {
        let records = vec![with_year(1, Some("2020"))];
        let group_by = compile_group_by::<Person>("GroupBy(( YEAR ))").unwrap();
        assert_eq!(group_by.field(), "YEAR");
        let json = serde_json::to_value(group_by.aggregate(&records)).unwrap();
        assert_eq!(json, serde_json::json!([{"YEAR": "2020", "count": 1}]));
    }

    #[test]
    fn test_groupby_null_is_its_own_group() {
        let records = vec![
            with_year(1, None),
            with_year(2, Some("2020")),
            with_year(3, None),
        ];
        let groups = compile_group_by::<Person>("groupby((year))")
            .unwrap()
            .aggregate(&records);
        assert_eq!(groups[0].key, Value::Null);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].count, 1);
    }

    #[test]
    fn test_groupby_native_values() {
        let records: Vec<Person> = [Some(1.5), Some(1.5), None]
            .into_iter()
            .enumerate()
            .map(|(i, price)| Person {
                id: i as i64,
                price,
                ..Default::default()
            })
            .collect();
        let groups = compile_group_by::<Person>("groupby((price))")
            .unwrap()
            .aggregate(&records);
        assert_eq!(groups[0].key, Value::Float(1.5));
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn test_groupby_empty_input() {
        let groups = compile_group_by::<Person>("groupby((year))")
            .unwrap()
            .aggregate(&Vec::<Person>::new());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_other_transformation_unsupported() {
        let err = compile_group_by::<Person>("aggregate((year))").unwrap_err();
        assert_eq!(err, QueryError::UnsupportedFunction("aggregate".to_string()));
    }

    #[test]
    fn test_malformed_groupby() {
        for input in [
            "groupby(year)",
            "groupby((year, city))",
            "groupby(())",
            "groupby((year)",
            "groupby((year!))",
            "groupby(('year'))",
            "groupby((1year))",
            "year",
            "",
        ] {
            let err = compile_group_by::<Person>(input).unwrap_err();
            assert!(matches!(err, QueryError::MalformedSyntax(_)), "{}", input);
        }
    }

    #[test]
    fn test_groupby_unknown_column() {
        let err = compile_group_by::<Person>("groupby((colour))").unwrap_err();
        assert_eq!(err, QueryError::UnknownColumn("colour".to_string()));
    }
}
