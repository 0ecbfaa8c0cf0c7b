//! SQLite repositories
//!
//! Record types are imported from `crate::data::types`.

pub mod dataset;

pub use dataset::{
    UpsertSummary, delete, get, insert, insert_batch, list_all, list_matching, update, upsert_batch,
};
