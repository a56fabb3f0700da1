// Watch-cycle orchestration

pub mod engine;

pub use engine::{WatchEngine, WatchEngineConfig, Watcher};
