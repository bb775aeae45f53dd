/// Wire event names for the dashboard socket.
pub const EVENT_ANALYTICS: &str = "analytics_data";
pub const EVENT_REALTIME: &str = "real_time_data";
