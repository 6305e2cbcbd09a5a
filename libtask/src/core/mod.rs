//! Core infrastructure for storing and accessing task and user documents.
pub mod database;
pub mod error;
pub mod model;
pub mod query;
pub mod schema;
