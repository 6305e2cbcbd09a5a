//! This is a library that defines the task and user documents of a small task
//! tracking database, fills the database with random sample data, and reads it
//! back with task references resolved.

pub mod core;
pub mod seed;
pub mod task;
pub mod user;

pub use core::database::Database;
pub use core::error::{Error, Result};
