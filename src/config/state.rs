// Application state module
// Shared, read-only configuration plus the live connection count

use std::sync::atomic::AtomicUsize;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            active_connections: AtomicUsize::new(0),
        }
    }
}
