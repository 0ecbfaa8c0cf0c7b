//! Data storage layer
//!
//! - `sqlite` - Connection pool, schema, migrations and dataset repositories
//! - `types` - The three 311 dataset record types
//! - `traits` - `Dataset`, the contract each record type fulfils for storage and routing

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::{SqliteError, SqliteService};
pub use traits::Dataset;
pub use types::{CallCenterInquiry, CustomerSatisfactionSurvey, ServiceRequest};
