//! Dataset record types
//!
//! Each record maps one row of a NYC 311 table. Besides the sqlx/serde
//! derives, every type registers its columns with the query engine so
//! `$filter`, `$orderby`, `$select` and `$apply` work over it.

mod call_center;
mod service_request;
mod survey;

pub use call_center::CallCenterInquiry;
pub use service_request::ServiceRequest;
pub use survey::CustomerSatisfactionSurvey;
