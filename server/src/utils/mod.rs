//! Small helpers shared across the server

pub mod crypto;
pub mod path;
pub mod terminal;
