use std::sync::Arc;

use capstone_events::NotificationSink;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: capstone_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Best-effort outbound notifications (SMTP or log-only).
    pub notifier: Arc<dyn NotificationSink>,
}
