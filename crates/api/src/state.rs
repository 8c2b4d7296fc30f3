//! Shared application state for the Axum API server.

use std::sync::Arc;

use courier_common::config::AppConfig;
use courier_notifier::NotificationDispatcher;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Cancelled on shutdown; every delivery waits on a child of this token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        dispatcher: Arc<NotificationDispatcher>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pool,
            config,
            dispatcher,
            shutdown,
        }
    }
}
