//! OData-style query engine
//!
//! Turns the `$filter`, `$orderby`, `$select` and `$apply` query-string
//! facets into typed operations over any record type implementing
//! [`Record`]:
//! - `token` / `parser` - filter grammar to [`Expr`] tree
//! - `schema` - per-type column registry and name resolution
//! - `value` - typed values and literal coercion
//! - `filter` - expression tree to [`Predicate`]
//! - `order`, `select`, `group` - the remaining facets
//! - `plan` - all facets bundled and executed over a record vector

pub mod ast;
pub mod error;
pub mod filter;
pub mod group;
pub mod order;
pub mod parser;
pub mod plan;
pub mod schema;
pub mod select;
pub mod token;
pub mod value;

pub use ast::Expr;
pub use error::{Facet, FacetError, QueryError};
pub use filter::{Predicate, compile_filter};
pub use group::{Group, GroupBy, compile_group_by};
pub use order::{Comparator, compile_order_by};
pub use parser::parse_filter;
pub use plan::{QueryOptions, QueryOutput, QueryPlan, QueryResult};
pub use schema::{Column, Record, Schema};
pub use select::{ProjectedRow, Projection, compile_select};
pub use value::{Value, ValueKind};
