pub mod errors;
pub mod schema;

pub use schema::{AppSchema, build_schema};
