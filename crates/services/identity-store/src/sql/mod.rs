//! SQL composition: template builder and schema names.

pub mod builder;
pub mod schema;

pub use builder::{insert_clause, projection, set_clause, where_clause, Batch, Params};
