use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::state::AppState;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analytics", get(api_analytics))
        .route("/api/health", get(api_health))
}

/// Full 30-day history for all five series. Always 200.
async fn api_analytics(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.analytics.snapshot().to_json())
}

async fn api_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "now_ts_ms": now_ms(),
        "ws_clients": state.broadcast.receiver_count(),
    }))
}
