use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Root of the trends site; API paths are resolved relative to it.
    pub upstream_base_url: String,
    /// Host language sent as `hl`, e.g. `en-US`.
    pub host_language: String,
    /// Timezone offset in minutes sent as `tz` (360 = UTC-6).
    pub tz_offset_minutes: i32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Total attempts per fetch, including the first one.
    pub max_attempts: u32,
    pub rate_limit_cooldown_secs: u64,
    pub wordcloud_max_words: usize,
    /// Inbound `/report` and `/api/v1/trends` requests allowed per minute.
    pub inbound_rate_limit_per_min: usize,
}
