use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub provider_base_url: String,
    pub provider_timeout_secs: u64,

    pub alert_check_interval_secs: u64,
    pub refresh_interval_secs: u64,
    pub refresh_lookback_days: i64,

    pub history_cache_ttl_secs: u64,
    pub quote_cache_ttl_secs: u64,

    pub default_portfolio: String,
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "marketpulse".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let provider_base_url = env::var("PROVIDER_BASE_URL")
        .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string());

    let default_portfolio = env::var("DEFAULT_PORTFOLIO")
        .unwrap_or_else(|_| "default".to_string());

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        provider_base_url,
        provider_timeout_secs: env_u64("PROVIDER_TIMEOUT_SECS", 10),
        alert_check_interval_secs: env_u64("ALERT_CHECK_INTERVAL_SECS", 60),
        refresh_interval_secs: env_u64("REFRESH_INTERVAL_SECS", 86_400),
        refresh_lookback_days: env_i64("REFRESH_LOOKBACK_DAYS", 5),
        history_cache_ttl_secs: env_u64("HISTORY_CACHE_TTL_SECS", 300),
        quote_cache_ttl_secs: env_u64("QUOTE_CACHE_TTL_SECS", 60),
        default_portfolio,
    }
}
