//! Application configuration loaded from environment variables.
//!
//! Shared by the API server and the CLI. A `.env` file in the working
//! directory is loaded first if present.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::models::{ActivityKind, GoalConfig, GoalDefinition, GoalThreshold};
use crate::services::smashrun;
use crate::time_utils::LocalTimezone;

/// Smashrun import settings.
#[derive(Debug, Clone)]
pub struct SmashrunConfig {
    pub api_url: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for SmashrunConfig {
    fn default() -> Self {
        Self {
            api_url: smashrun::DEFAULT_API_URL.to_string(),
            access_token: None,
            refresh_token: None,
            client_id: None,
            client_secret: None,
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- API server ---
    /// Server port
    pub port: u16,
    /// GCP project ID; without it the server keeps records in memory
    pub gcp_project_id: Option<String>,
    /// SHA-256 of the API key the server accepts
    pub api_key_digest: Option<[u8; 32]>,

    // --- CLI ---
    /// Base URL of the deployed API (cloud mode)
    pub api_url: String,
    /// API key sent by the CLI in cloud mode
    pub api_key: Option<String>,
    /// Use the deployed API instead of the local file
    pub use_cloud: bool,
    /// Local JSON store
    pub local_db_path: PathBuf,
    pub debug: bool,

    // --- Shared ---
    /// Bound on every outgoing HTTP request
    pub request_timeout: Duration,
    /// Timezone that decides which day an activity counts toward
    pub timezone: LocalTimezone,
    pub goals: GoalConfig,
    pub smashrun: SmashrunConfig,
}

impl Config {
    /// Config for tests: accepts the key "test-api-key", UTC, default goals.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: None,
            api_key_digest: Some(api_key_digest("test-api-key")),
            api_url: "http://localhost:8080".to_string(),
            api_key: Some("test-api-key".to_string()),
            use_cloud: false,
            local_db_path: PathBuf::from("data/fitlog.json"),
            debug: false,
            request_timeout: Duration::from_secs(5),
            timezone: LocalTimezone::default(),
            goals: GoalConfig::default(),
            smashrun: SmashrunConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("FITLOG_API_KEY");
        let api_key_digest = match get("FITLOG_API_KEY_SHA256") {
            Some(hex_digest) => Some(parse_digest(&hex_digest)?),
            None => api_key.as_deref().map(api_key_digest),
        };

        let timezone = match get("FITLOG_TIMEZONE") {
            Some(raw) => raw
                .parse::<LocalTimezone>()
                .map_err(|_| ConfigError::Invalid("FITLOG_TIMEZONE", raw))?,
            None => LocalTimezone::default(),
        };

        let config = Self {
            port: parse_or(&get, "PORT", 8080)?,
            gcp_project_id: get("GCP_PROJECT_ID"),
            api_key_digest,
            api_url: get("FITLOG_API_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            api_key,
            use_cloud: parse_bool(&get, "FITLOG_USE_CLOUD")?,
            local_db_path: get("FITLOG_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/fitlog.json")),
            debug: parse_bool(&get, "FITLOG_DEBUG")?,
            request_timeout: Duration::from_secs(parse_or(&get, "FITLOG_REQUEST_TIMEOUT", 30)?),
            timezone,
            goals: load_goals(&get)?,
            smashrun: SmashrunConfig {
                api_url: get("SMASHRUN_API_URL")
                    .unwrap_or_else(|| smashrun::DEFAULT_API_URL.to_string()),
                access_token: get("SMASHRUN_ACCESS_TOKEN"),
                refresh_token: get("SMASHRUN_REFRESH_TOKEN"),
                client_id: get("SMASHRUN_CLIENT_ID"),
                client_secret: get("SMASHRUN_CLIENT_SECRET"),
            },
        };

        Ok(config)
    }

    /// API key the CLI must send in cloud mode.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing("FITLOG_API_KEY"))
    }

    /// Digest the server checks incoming keys against.
    pub fn require_api_key_digest(&self) -> Result<[u8; 32], ConfigError> {
        self.api_key_digest
            .ok_or(ConfigError::Missing("FITLOG_API_KEY"))
    }

    /// Smashrun credentials from the environment, if an access token is set.
    pub fn smashrun_credentials(&self) -> Option<smashrun::SmashrunCredentials> {
        let access_token = self.smashrun.access_token.clone()?;
        Some(smashrun::SmashrunCredentials {
            access_token,
            refresh_token: self.smashrun.refresh_token.clone(),
            client_id: self.smashrun.client_id.clone(),
            client_secret: self.smashrun.client_secret.clone(),
        })
    }
}

/// SHA-256 of an API key.
pub fn api_key_digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

fn parse_digest(raw: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = hex::decode(raw)
        .map_err(|_| ConfigError::Invalid("FITLOG_API_KEY_SHA256", raw.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| ConfigError::Invalid("FITLOG_API_KEY_SHA256", raw.to_string()))
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

fn parse_bool<G>(get: &G, name: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).map(|v| v.to_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(false),
        Some(v) => Err(ConfigError::Invalid(name, v)),
    }
}

fn load_goals<G>(get: &G) -> Result<GoalConfig, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let mut goals = GoalConfig::default();

    if let Some(raw) = get("FITLOG_PUSHUPS_MIN_REPS") {
        let count = raw
            .parse()
            .map_err(|_| ConfigError::Invalid("FITLOG_PUSHUPS_MIN_REPS", raw))?;
        goals.pushups.threshold = GoalThreshold::MinRepetitions { count };
    }
    if let Some(raw) = get("FITLOG_RUN_MIN_MILES") {
        let miles: f64 = raw
            .parse()
            .ok()
            .filter(|m: &f64| m.is_finite() && *m > 0.0)
            .ok_or(ConfigError::Invalid("FITLOG_RUN_MIN_MILES", raw))?;
        goals.run.threshold = GoalThreshold::MinDistance { miles };
    }

    load_targets(get, &mut goals.run, "FITLOG_RUN")?;
    load_targets(get, &mut goals.pushups, "FITLOG_PUSHUPS")?;

    for kind in ActivityKind::ALL {
        goals
            .for_kind(kind)
            .validate()
            .map_err(|msg| ConfigError::Invalid("goal", msg))?;
    }
    Ok(goals)
}

fn load_targets<G>(get: &G, goal: &mut GoalDefinition, prefix: &str) -> Result<(), ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let targets = [
        ("DAYS_PER_WEEK", &mut goal.required_days.week),
        ("DAYS_PER_MONTH", &mut goal.required_days.month),
        ("DAYS_PER_YEAR", &mut goal.required_days.year),
    ];
    for (suffix, slot) in targets {
        let name = format!("{}_{}", prefix, suffix);
        if let Some(raw) = get(&name) {
            *slot = raw
                .parse()
                .map_err(|_| ConfigError::Invalid("goal", format!("{}={}", name, raw)))?;
        }
    }
    Ok(())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
