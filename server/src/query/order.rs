//! `$orderby` parsing and multi-key sorting

use std::cmp::Ordering;

use super::error::QueryError;
use super::schema::{Column, Record};

#[derive(Debug, Clone, Copy)]
pub struct SortKey<R> {
    pub column: Column<R>,
    pub descending: bool,
}

/// Compiled `$orderby` clause
#[derive(Debug)]
pub struct Comparator<R> {
    keys: Vec<SortKey<R>>,
}

impl<R> Comparator<R> {
    /// Compare two records key by key; the first non-equal key decides
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        for key in &self.keys {
            let ord = key.column.read(a).sort_cmp(&key.column.read(b));
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable sort: records equal under every key keep their input order
    pub fn sort(&self, records: &mut [R]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Parse `field [asc|desc] (, field [asc|desc])*`
pub fn compile_order_by<R: Record>(input: &str) -> Result<Comparator<R>, QueryError> {
    let schema = R::query_schema();
    let mut keys = Vec::new();

    for segment in input.split(',') {
        let mut words = segment.split_whitespace();
        let Some(name) = words.next() else {
            continue;
        };

        let descending = match words.next() {
            None => false,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => false,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => true,
            Some(dir) => {
                return Err(QueryError::syntax(format!(
                    "unexpected sort direction '{}' for '{}', expected asc or desc",
                    dir, name
                )));
            }
        };
        if let Some(extra) = words.next() {
            return Err(QueryError::syntax(format!(
                "unexpected '{}' in sort key '{}'",
                extra,
                segment.trim()
            )));
        }

        let column = *schema.resolve(name)?;
        keys.push(SortKey { column, descending });
    }

    if keys.is_empty() {
        return Err(QueryError::syntax("no sort keys given"));
    }
    Ok(Comparator { keys })
}
