use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the recommendation endpoint, e.g. `"https://recs.example.com"`.
    pub recs_url: String,
    /// Merchant account id sent with every recommendation request.
    pub account_id: String,
    /// Storefront origin used for cart mutations. Absent for recommendation-only use.
    pub shop_url: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Coalescing window for campaign requests.
    pub batch_delay_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("recs_url", &self.recs_url)
            .field("account_id", &"[redacted]")
            .field("shop_url", &self.shop_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .finish()
    }
}
