// Common library for shared code across the watcher and API binaries

pub mod alert;
pub mod config;
pub mod db;
pub mod errors;
pub mod listing;
pub mod models;
pub mod subscriptions;
pub mod telemetry;
pub mod watcher;
