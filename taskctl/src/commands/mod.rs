pub(crate) mod config;
pub(crate) mod query;
pub(crate) mod schema;
pub(crate) mod seed;
