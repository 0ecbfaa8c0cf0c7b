//! HBC server: an OData-style query engine and REST host for NYC 311 datasets

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod query;
pub mod utils;
