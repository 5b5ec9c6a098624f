// config.rs
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub http_timeout: Duration,
    pub notification_poll: Duration,
    pub chat_poll: Duration,
    pub conversations_poll: Duration,
    pub log_level: String,
    // Credentials for the headless binary when no session is stored
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn init() -> Result<Config, ClientError> {
        let api_base_url = std::env::var("API_BASE_URL")
            .map_err(|_| ClientError::Config("API_BASE_URL must be set".to_string()))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "API_BASE_URL must be an http(s) url, got {}",
                api_base_url
            )));
        }

        let session_file = std::env::var("SESSION_FILE")
            .unwrap_or_else(|_| ".workdesk/session.json".to_string());
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());

        Ok(Config {
            api_base_url,
            session_file: PathBuf::from(session_file),
            http_timeout: secs_or("HTTP_TIMEOUT_SECS", 30)?,
            notification_poll: secs_or("NOTIFICATION_POLL_SECS", 60)?,
            chat_poll: secs_or("CHAT_POLL_SECS", 5)?,
            conversations_poll: secs_or("CONVERSATIONS_POLL_SECS", 10)?,
            log_level,
            email: non_empty_var("WORKDESK_EMAIL"),
            password: non_empty_var("WORKDESK_PASSWORD"),
        })
    }

    /// Defaults for everything but the server address.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Config {
        Config {
            api_base_url: api_base_url.into(),
            session_file: PathBuf::from(".workdesk/session.json"),
            http_timeout: Duration::from_secs(30),
            notification_poll: Duration::from_secs(60),
            chat_poll: Duration::from_secs(5),
            conversations_poll: Duration::from_secs(10),
            log_level: "debug".to_string(),
            email: None,
            password: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ClientError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ClientError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// A whole number of seconds; zero is refused since timers need a period.
fn secs_or(key: &str, default: u64) -> Result<Duration, ClientError> {
    match env_or(key, default)? {
        0 => Err(ClientError::Config(format!("{} must be greater than zero", key))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
