pub mod backend;
pub mod schema;
mod stats;
mod store_impl;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `hitcount_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
