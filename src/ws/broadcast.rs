use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Fan-out hub for server-push frames.
///
/// One channel feeds every connected socket; a lagging receiver skips
/// frames instead of blocking the ticker. Clone-able via the internal
/// sender.
#[derive(Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<String>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register a new socket. The receiver sees every frame published
    /// after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Push a frame to all connected sockets and return the receiver
    /// count. Returns 0 when nobody is connected.
    pub fn publish(&self, message: String) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    /// Number of currently connected sockets.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_reports_zero() {
        let hub = BroadcastHub::new();
        assert_eq!(hub.receiver_count(), 0);
        assert_eq!(hub.publish("tick".to_string()), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_published_frame() {
        let hub = BroadcastHub::new();
        let mut rx = hub.subscribe();
        assert_eq!(hub.receiver_count(), 1);
        assert_eq!(hub.publish("tick".to_string()), 1);
        assert_eq!(rx.recv().await.unwrap(), "tick");
    }

    #[tokio::test]
    async fn dropped_subscriber_leaves_the_count() {
        let hub = BroadcastHub::new();
        let rx = hub.subscribe();
        drop(rx);
        assert_eq!(hub.receiver_count(), 0);
        assert_eq!(hub.publish("tick".to_string()), 0);
    }
}
