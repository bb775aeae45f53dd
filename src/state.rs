use chrono::Local;
use std::sync::Arc;

use crate::config::HubConfig;
use crate::metrics::SeriesStore;
use crate::ws::broadcast::BroadcastHub;

/// Shared application state, passed to all route handlers via
/// `axum::extract::State`.
pub struct AppState {
    pub config: HubConfig,
    pub broadcast: BroadcastHub,
    /// Rolling daily history, seeded at startup and grown by the ticker.
    pub analytics: SeriesStore,
}

impl AppState {
    pub fn new(config: HubConfig) -> Arc<Self> {
        let analytics = SeriesStore::seeded(Local::now().date_naive());
        Arc::new(Self {
            config,
            broadcast: BroadcastHub::new(),
            analytics,
        })
    }
}
