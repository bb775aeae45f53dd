pub mod broadcast;
pub mod events;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::stream::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;
use events::EVENT_ANALYTICS;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

#[derive(Debug, Deserialize)]
struct WsClientMsg {
    #[serde(rename = "type")]
    msg_type: String,
}

/// Serialized `analytics_data` frame built from the store as it is right now.
fn analytics_frame(state: &AppState) -> String {
    json!({
        "type": EVENT_ANALYTICS,
        "data": state.analytics.snapshot().to_json(),
    })
    .to_string()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Every socket sees the live tick stream; there is no subscribe
    // handshake.
    let mut ticks = state.broadcast.subscribe();

    // Direct replies and forwarded ticks share one outgoing channel.
    let (tx_to_client, mut rx_to_client) = tokio::sync::mpsc::channel::<String>(64);

    let forward_task = tokio::spawn(async move {
        while let Some(msg) = rx_to_client.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    tracing::info!("ws client connected");

    // Initial history push, so the dashboard renders before the first tick.
    if tx_to_client.send(analytics_frame(&state)).await.is_err() {
        forward_task.abort();
        return;
    }

    loop {
        tokio::select! {
            // Live tick → client.
            tick = ticks.recv() => {
                match tick {
                    Ok(frame) => {
                        if tx_to_client.send(frame).await.is_err() {
                            break;
                        }
                    }
                    // Lagged just means missed ticks; keep the socket.
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
            // Client message
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(parsed) = serde_json::from_str::<WsClientMsg>(&text) {
                            match parsed.msg_type.as_str() {
                                "request_data" => {
                                    if tx_to_client.send(analytics_frame(&state)).await.is_err() {
                                        break;
                                    }
                                }
                                "ping" => {
                                    let _ = tx_to_client.send(r#"{"type":"pong"}"#.to_string()).await;
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!("ws client disconnected");
    forward_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use crate::metrics::HISTORY_DAYS;
    use std::path::PathBuf;

    fn test_state() -> Arc<AppState> {
        AppState::new(HubConfig {
            bind: "127.0.0.1".to_string(),
            port: 0,
            tick_ms: 2000,
            static_dir: PathBuf::from("frontend/dist"),
        })
    }

    #[test]
    fn analytics_frame_carries_all_five_series() {
        let state = test_state();
        let v: serde_json::Value = serde_json::from_str(&analytics_frame(&state)).unwrap();

        assert_eq!(v["type"], EVENT_ANALYTICS);
        for name in ["users", "sales", "page_views", "conversions", "revenue"] {
            assert_eq!(
                v["data"][name].as_array().unwrap().len(),
                HISTORY_DAYS,
                "series {name}"
            );
        }
    }

    #[test]
    fn analytics_frame_reflects_the_store_at_call_time() {
        let state = test_state();
        let first: serde_json::Value = serde_json::from_str(&analytics_frame(&state)).unwrap();

        let tomorrow = chrono::Local::now().date_naive() + chrono::Duration::days(1);
        state.analytics.append_and_trim(tomorrow);

        let second: serde_json::Value = serde_json::from_str(&analytics_frame(&state)).unwrap();
        let last = HISTORY_DAYS - 1;
        assert_ne!(
            first["data"]["users"][last]["date"],
            second["data"]["users"][last]["date"]
        );
        assert_eq!(
            second["data"]["users"][last]["date"],
            tomorrow.to_string()
        );
    }
}
