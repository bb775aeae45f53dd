use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::metrics::RealtimeSnapshot;
use crate::state::AppState;
use crate::ws::events::EVENT_REALTIME;

/// Handle to the periodic broadcast task. Dropping it does not stop the
/// task; call `stop()` for a clean shutdown.
pub struct Ticker {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

impl Ticker {
    /// Signal the task to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

/// Start the broadcast loop: every `tick_ms`, push one live snapshot to
/// all connected sockets, then append today's point to the series store.
pub fn spawn(state: Arc<AppState>) -> Ticker {
    let (stop, mut stopped) = watch::channel(false);
    let tick_ms = state.config.tick_ms;

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
        // The first `tick()` completes immediately; consume it so the
        // loop body first runs a full period after startup.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => tick(&state),
                _ = stopped.changed() => break,
            }
        }

        tracing::debug!("ticker stopped");
    });

    Ticker { handle, stop }
}

/// One tick body: emit `real_time_data`, then grow the store.
fn tick(state: &AppState) {
    let snap = RealtimeSnapshot::sample(&mut rand::thread_rng(), Utc::now());

    if let Ok(frame) = serde_json::to_string(&json!({
        "type": EVENT_REALTIME,
        "data": snap,
    })) {
        let receivers = state.broadcast.publish(frame);
        tracing::debug!("tick broadcast to {receivers} sockets");
    }

    state.analytics.append_and_trim(Local::now().date_naive());
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
            tick_ms: 10,
            static_dir: PathBuf::from("frontend/dist"),
        })
    }

    #[tokio::test]
    async fn tick_broadcasts_a_realtime_frame_and_rolls_the_store() {
        let state = test_state();
        let mut rx = state.broadcast.subscribe();
        let before = state.analytics.snapshot();

        tick(&state);

        let frame = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["type"], EVENT_REALTIME);
        assert!(v["data"]["active_users"].is_i64());
        assert!(v["data"]["conversion_rate"].is_f64());
        assert!(v["data"]["timestamp"].is_string());

        // The store was already full, so each series rolled forward by one.
        let after = state.analytics.snapshot();
        for ((_, b), (_, a)) in before.series().iter().zip(after.series().iter()) {
            assert_eq!(a.len(), HISTORY_DAYS);
            assert_eq!(&b[1..], &a[..HISTORY_DAYS - 1]);
        }
    }

    #[tokio::test]
    async fn stop_terminates_the_task() {
        let state = test_state();
        let ticker = spawn(state);
        // Returns only once the task has actually finished.
        ticker.stop().await;
    }
}
