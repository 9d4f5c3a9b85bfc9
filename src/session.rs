//! Per-frame try-on sessions.

pub mod config;
pub mod orchestrator;

pub use config::SessionConfig;
pub use orchestrator::{SessionStats, TryOnSession};
