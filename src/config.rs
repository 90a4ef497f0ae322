//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment and read
//! once at startup.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::env;

/// Default local offset (UTC+3) used for trigger times and calendar dates.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 180;

/// Which repository implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage implementation
    pub storage_backend: StorageBackend,
    /// Offset of the local clock the schedule runs on
    pub local_offset: FixedOffset,
    /// Whether the in-process timers feed the scheduler queue
    pub scheduler_enabled: bool,
    /// Chat that receives aggregate sweep failures
    pub operator_chat_id: Option<i64>,
    /// Secret path segment of the webhook URL
    pub webhook_path_uuid: String,

    // --- Secrets ---
    /// Telegram Bot API token
    pub telegram_bot_token: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value
    pub webhook_secret_token: String,
    /// Bearer secret for `/tasks/*` job triggers
    pub scheduler_secret: String,
}

impl Config {
    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            local_offset: default_offset(),
            scheduler_enabled: false,
            operator_chat_id: None,
            webhook_path_uuid: "test-webhook-uuid".to_string(),
            telegram_bot_token: "test_bot_token".to_string(),
            webhook_secret_token: "test_secret_token".to_string(),
            scheduler_secret: "test_scheduler_secret".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let offset_minutes = match env::var("LOCAL_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::Invalid("LOCAL_UTC_OFFSET_MINUTES", raw.clone()))?,
            Err(_) => DEFAULT_UTC_OFFSET_MINUTES,
        };
        let local_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid("LOCAL_UTC_OFFSET_MINUTES", offset_minutes.to_string())
        })?;

        let operator_chat_id = match env::var("OPERATOR_CHAT_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ConfigError::Invalid("OPERATOR_CHAT_ID", raw.clone()))?,
            ),
            _ => None,
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend: env::var("STORAGE_BACKEND")
                .map(|raw| StorageBackend::parse(&raw))
                .unwrap_or(Ok(StorageBackend::Firestore))?,
            local_offset,
            scheduler_enabled: env::var("SCHEDULER_ENABLED")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
                .unwrap_or(true),
            operator_chat_id,
            webhook_path_uuid: env::var("WEBHOOK_PATH_UUID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_PATH_UUID"))?,

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?,
            webhook_secret_token: env::var("WEBHOOK_SECRET_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_SECRET_TOKEN"))?,
            scheduler_secret: env::var("SCHEDULER_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SCHEDULER_SECRET"))?,
        })
    }

    /// Current wall-clock time in the configured local offset.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.local_offset)
    }

    /// Today's calendar date in the configured local offset.
    pub fn local_today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }
}

fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
