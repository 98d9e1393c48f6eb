use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        base_url: get_env_or_default("SCOUT_BASE_URL", "https://www.olx.ua"),
        search_path: get_env_or_default("SCOUT_SEARCH_PATH", "/d/uk/list/"),
        currency: get_env_or_default("SCOUT_CURRENCY", "грн"),
        session_timeout: Duration::from_secs(get_env_parsed("SCOUT_SESSION_TIMEOUT_SECS", 120)),
        http_timeout: Duration::from_secs(get_env_parsed("SCOUT_HTTP_TIMEOUT_SECS", 10)),
        schedule_path: get_env_or_default("SCOUT_SCHEDULE_PATH", "schedule.json"),
        listen_addr: get_env_or_default("SCOUT_LISTEN_ADDR", "127.0.0.1:3000"),
    }
});

pub struct Config {
    /// Origin of the classifieds site, also used to absolutize relative links.
    pub base_url: String,
    pub search_path: String,
    pub currency: String,
    /// Inactivity window after which a search session expires.
    pub session_timeout: Duration,
    pub http_timeout: Duration,
    pub schedule_path: String,
    pub listen_addr: String,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("invalid value {raw:?} for {key}, using default");
            default
        }),
        Err(_) => default,
    }
}
