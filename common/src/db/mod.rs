// Database module for PostgreSQL connection pooling and repositories

pub mod pool;
pub mod repositories;

pub use pool::DbPool;
