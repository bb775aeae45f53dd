use std::env;
use std::path::PathBuf;

/// Hub configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind: String,
    pub port: u16,
    /// Live broadcast period in milliseconds.
    pub tick_ms: u64,
    /// Built dashboard frontend, served at `/`.
    pub static_dir: PathBuf,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("DASH_BIND", "127.0.0.1"),
            port: env_u16("DASH_PORT", 5001),
            tick_ms: env_u64("DASH_TICK_MS", 2000),
            static_dir: PathBuf::from(env_str("DASH_STATIC_DIR", "frontend/dist")),
        }
    }
}
