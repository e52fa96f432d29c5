use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

/// Largest token list FCM accepts in a single multicast.
pub const FCM_TOKENS_THRESHOLD: usize = 500;

/// APNs category for hall-type shows.
pub const NOTI_CATEGORY_HALL: &str = "hall";

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub webhook_url: String,
    pub webhook_secret: String,

    #[serde(default = "default_webhook_timeout_seconds")]
    pub webhook_timeout_seconds: u64,

    pub fcm_project_id: String,

    #[serde(default = "default_fcm_base_url")]
    pub fcm_base_url: String,

    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    #[serde(default = "default_multicast_concurrency")]
    pub multicast_concurrency: usize,

    #[serde(default = "default_apns_category")]
    pub apns_category: String,

    /// Injected by the hosting platform; wins over `SERVER_PORT`.
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub server_port: Option<u16>,
}

fn default_webhook_timeout_seconds() -> u64 {
    10
}

fn default_fcm_base_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_max_batch_size() -> usize {
    FCM_TOKENS_THRESHOLD
}

fn default_multicast_concurrency() -> usize {
    100
}

fn default_apns_category() -> String {
    NOTI_CATEGORY_HALL.to_string()
}

const DEFAULT_SERVER_PORT: u16 = 8080;

impl Config {
    /// Loads `.env.{APP_ENV}` when a profile is selected, then `.env`, then
    /// reads the process environment.
    pub fn load() -> Result<Self, Error> {
        if let Ok(profile) = std::env::var("APP_ENV") {
            dotenvy::from_filename(format!(".env.{}", profile)).ok();
        }
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        config.validate()
    }

    pub fn from_iter<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        config.validate()
    }

    fn validate(self) -> Result<Self, Error> {
        if self.max_batch_size == 0 || self.max_batch_size > FCM_TOKENS_THRESHOLD {
            return Err(anyhow!(
                "MAX_BATCH_SIZE must be between 1 and {}, got {}",
                FCM_TOKENS_THRESHOLD,
                self.max_batch_size
            ));
        }

        if self.multicast_concurrency == 0 {
            return Err(anyhow!("MULTICAST_CONCURRENCY must be at least 1"));
        }

        if self.webhook_secret.is_empty() {
            return Err(anyhow!("WEBHOOK_SECRET cannot be empty"));
        }

        Ok(self)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_seconds)
    }

    pub fn listen_port(&self) -> u16 {
        self.port.or(self.server_port).unwrap_or(DEFAULT_SERVER_PORT)
    }
}
