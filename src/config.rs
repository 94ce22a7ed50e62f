//! Process configuration, read from the environment (and `.env` if present).

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    /// sqlx connection url, e.g. `sqlite://socialite.db?mode=rwc`
    pub database_url: String,
    pub bind_addr: String,
    pub max_db_connections: u32,
    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,
    pub secure_cookies: bool,
    /// When set, browsers on this origin may call the api with credentials.
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://socialite.db?mode=rwc".to_owned(),
            bind_addr: "0.0.0.0:7000".to_owned(),
            max_db_connections: 16,
            session_inactivity_minutes: 24 * 60,
            secure_cookies: false,
            cors_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            config.max_db_connections = max
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS={max} is not a number"))?;
        }
        if let Some(minutes) = lookup("SESSION_INACTIVITY_MINUTES") {
            config.session_inactivity_minutes = minutes
                .parse()
                .with_context(|| format!("SESSION_INACTIVITY_MINUTES={minutes} is not a number"))?;
        }
        if let Some(secure) = lookup("SECURE_COOKIES") {
            config.secure_cookies = secure
                .parse()
                .with_context(|| format!("SECURE_COOKIES={secure} is not true/false"))?;
        }
        config.cors_origin = lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty());

        Ok(config)
    }
}
