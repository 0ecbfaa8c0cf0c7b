//! Compiled query over a record type and its execution

use serde::Serialize;

use super::error::{Facet, FacetError};
use super::filter::{Predicate, compile_filter};
use super::group::{Group, GroupBy, compile_group_by};
use super::order::{Comparator, compile_order_by};
use super::schema::Record;
use super::select::{ProjectedRow, Projection, compile_select};

/// Raw query-string facets, before compilation
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub select: Option<String>,
    pub apply: Option<String>,
    pub top: Option<usize>,
    pub skip: Option<usize>,
    pub count: bool,
}

/// Every facet compiled against `R`
#[derive(Debug)]
pub struct QueryPlan<R> {
    filter: Option<Predicate<R>>,
    order_by: Option<Comparator<R>>,
    projection: Projection<R>,
    group_by: Option<GroupBy<R>>,
    top: Option<usize>,
    skip: usize,
    count: bool,
}

/// Result rows plus the optional `@odata.count`
#[derive(Debug, Serialize)]
pub struct QueryResult<R> {
    pub value: QueryOutput<R>,
    #[serde(rename = "@odata.count", skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryOutput<R> {
    Records(Vec<R>),
    Rows(Vec<ProjectedRow>),
    Groups(Vec<Group>),
}

impl<R> QueryOutput<R> {
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Records(v) => v.len(),
            QueryOutput::Rows(v) => v.len(),
            QueryOutput::Groups(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn non_blank(facet: &Option<String>) -> Option<&str> {
    facet.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl<R: Record> QueryPlan<R> {
    /// Compile every facet. The first facet that fails rejects the query.
    pub fn compile(options: &QueryOptions) -> Result<Self, FacetError> {
        let filter = non_blank(&options.filter)
            .map(compile_filter::<R>)
            .transpose()
            .map_err(|e| FacetError::new(Facet::Filter, e))?;
        let order_by = non_blank(&options.order_by)
            .map(compile_order_by::<R>)
            .transpose()
            .map_err(|e| FacetError::new(Facet::OrderBy, e))?;
        let projection = compile_select::<R>(options.select.as_deref().unwrap_or_default())
            .map_err(|e| FacetError::new(Facet::Select, e))?;
        let group_by = non_blank(&options.apply)
            .map(compile_group_by::<R>)
            .transpose()
            .map_err(|e| FacetError::new(Facet::Apply, e))?;

        Ok(Self {
            filter,
            order_by,
            projection,
            group_by,
            top: options.top,
            skip: options.skip.unwrap_or(0),
            count: options.count,
        })
    }

    /// Whether a record passes `$filter`. Always true without one.
    pub fn matches(&self, record: &R) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(record))
    }

    /// Run the plan: filter, then either group, or count, order, page and project
    pub fn execute(&self, mut records: Vec<R>) -> QueryResult<R> {
        records.retain(|r| self.matches(r));
        self.execute_matched(records)
    }

    /// Run every stage after filtering over records already accepted by
    /// [`QueryPlan::matches`]
    pub fn execute_matched(&self, mut records: Vec<R>) -> QueryResult<R> {
        if let Some(group_by) = &self.group_by {
            let groups = group_by.aggregate(&records);
            let count = self.count.then_some(groups.len());
            return QueryResult {
                value: QueryOutput::Groups(groups),
                count,
            };
        }

        let count = self.count.then_some(records.len());

        if let Some(order_by) = &self.order_by {
            order_by.sort(&mut records);
        }

        let page = records
            .into_iter()
            .skip(self.skip)
            .take(self.top.unwrap_or(usize::MAX));

        let value = if self.projection.is_identity() {
            QueryOutput::Records(page.collect())
        } else {
            QueryOutput::Rows(page.filter_map(|r| self.projection.project(&r)).collect())
        };

        QueryResult { value, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::QueryError;
    use crate::query::schema::fixtures::Person;

    fn fixture() -> Vec<Person> {
        let rows = [
            (1, "Ann", "Queens", "2020", 5.0),
            (2, "Bob", "Bronx", "2020", 15.0),
            (3, "Cid", "Queens", "2021", 25.0),
            (4, "Dee", "Bronx", "2021", 35.0),
            (5, "Eve", "Queens", "2020", 45.0),
        ];
        rows.into_iter()
            .map(|(id, name, city, year, price)| Person {
                id,
                name: Some(name.to_string()),
                city: Some(city.to_string()),
                year: Some(year.to_string()),
                price: Some(price),
                ..Default::default()
            })
            .collect()
    }

    fn options() -> QueryOptions {
        QueryOptions::default()
    }

    fn record_ids(result: &QueryResult<Person>) -> Vec<i64> {
        match &result.value {
            QueryOutput::Records(records) => records.iter().map(|r| r.id).collect(),
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_options_return_everything() {
        let plan = QueryPlan::<Person>::compile(&options()).unwrap();
        let result = plan.execute(fixture());
        assert_eq!(record_ids(&result), vec![1, 2, 3, 4, 5]);
        assert_eq!(result.count, None);
    }

    #[test]
    fn test_count_is_before_paging() {
        let plan = QueryPlan::<Person>::compile(&QueryOptions {
            filter: Some("city eq 'Queens'".into()),
            order_by: Some("price desc".into()),
            top: Some(2),
            skip: Some(1),
            count: true,
            ..options()
        })
        .unwrap();
        let result = plan.execute(fixture());
        assert_eq!(result.count, Some(3));
        assert_eq!(record_ids(&result), vec![3, 1]);
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        let plan = QueryPlan::<Person>::compile(&QueryOptions {
            skip: Some(10),
            ..options()
        })
        .unwrap();
        assert!(plan.execute(fixture()).value.is_empty());
    }

    #[test]
    fn test_projection_applied_after_paging() {
        let plan = QueryPlan::<Person>::compile(&QueryOptions {
            select: Some("Name,price".into()),
            order_by: Some("name desc".into()),
            top: Some(1),
            ..options()
        })
        .unwrap();
        let json = serde_json::to_value(plan.execute(fixture())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"value": [{"Name": "Eve", "price": 45.0}]})
        );
    }

    #[test]
    fn test_groupby_over_filtered_records() {
        let plan = QueryPlan::<Person>::compile(&QueryOptions {
            filter: Some("price gt 10".into()),
            apply: Some("groupby((year))".into()),
            top: Some(1),
            count: true,
            ..options()
        })
        .unwrap();
        let json = serde_json::to_value(plan.execute(fixture())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": [{"year": "2020", "count": 2}, {"year": "2021", "count": 2}],
                "@odata.count": 2
            })
        );
    }

    #[test]
    fn test_matches_then_execute_matched() {
        let plan = QueryPlan::<Person>::compile(&QueryOptions {
            filter: Some("city eq 'Bronx'".into()),
            count: true,
            ..options()
        })
        .unwrap();
        let matched: Vec<Person> = fixture().into_iter().filter(|r| plan.matches(r)).collect();
        let result = plan.execute_matched(matched);
        assert_eq!(record_ids(&result), vec![2, 4]);
        assert_eq!(result.count, Some(2));

        let unfiltered = QueryPlan::<Person>::compile(&options()).unwrap();
        assert!(fixture().iter().all(|r| unfiltered.matches(r)));
    }

    #[test]
    fn test_blank_facets_are_ignored() {
        let plan = QueryPlan::<Person>::compile(&QueryOptions {
            filter: Some("  ".into()),
            order_by: Some(String::new()),
            apply: Some(" ".into()),
            ..options()
        })
        .unwrap();
        assert_eq!(plan.execute(fixture()).value.len(), 5);
    }

    #[test]
    fn test_errors_carry_facet() {
        let cases = [
            (
                QueryOptions {
                    filter: Some("colour eq 'red'".into()),
                    ..options()
                },
                Facet::Filter,
            ),
            (
                QueryOptions {
                    order_by: Some("colour".into()),
                    ..options()
                },
                Facet::OrderBy,
            ),
            (
                QueryOptions {
                    select: Some("colour".into()),
                    ..options()
                },
                Facet::Select,
            ),
            (
                QueryOptions {
                    apply: Some("groupby((colour))".into()),
                    ..options()
                },
                Facet::Apply,
            ),
        ];
        for (opts, facet) in cases {
            let err = QueryPlan::<Person>::compile(&opts).unwrap_err();
            assert_eq!(err.facet, facet);
            assert_eq!(err.error, QueryError::UnknownColumn("colour".to_string()));
        }
    }
}
