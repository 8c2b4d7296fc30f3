//! Health check endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health — Liveness plus a database ping and the active transports.
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "unavailable"
        }
    };

    let (mail, sms) = state.dispatcher.transport_names();

    Json(json!({
        "status": if database == "ok" { "ok" } else { "degraded" },
        "service": "courier-api",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "transports": { "email": mail, "sms": sms }
    }))
}
