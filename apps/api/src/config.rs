use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::applications::DuplicatePolicy;
use crate::session::storage::DEFAULT_SESSION_KEY;

/// Where the session record lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    File(PathBuf),
    Redis { url: String, key: String },
    Memory,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a selected backend is missing its settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub session_backend: SessionBackend,
    pub seed_demo_jobs: bool,
    pub duplicate_policy: DuplicatePolicy,
    /// When set, login and registration go to this marketplace service.
    pub marketplace_api_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_backend = match get("SESSION_BACKEND").as_deref().unwrap_or("file") {
            "file" => SessionBackend::File(
                get("SESSION_FILE")
                    .unwrap_or_else(|| ".vertex/session.json".to_string())
                    .into(),
            ),
            "redis" => SessionBackend::Redis {
                url: get("REDIS_URL")
                    .context("Required environment variable 'REDIS_URL' is not set")?,
                key: get("SESSION_KEY").unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string()),
            },
            "memory" => SessionBackend::Memory,
            other => bail!("SESSION_BACKEND must be one of file, redis, memory (got '{other}')"),
        };

        let duplicate_policy = match get("DUPLICATE_APPLICATIONS").as_deref().unwrap_or("allow") {
            "allow" => DuplicatePolicy::Allow,
            "reject" => DuplicatePolicy::Reject,
            other => bail!("DUPLICATE_APPLICATIONS must be allow or reject (got '{other}')"),
        };

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_backend,
            seed_demo_jobs: parse_bool(get("SEED_DEMO_JOBS").as_deref(), true)
                .context("SEED_DEMO_JOBS must be true or false")?,
            duplicate_policy,
            marketplace_api_url: get("MARKETPLACE_API_URL"),
        })
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => bail!("invalid boolean '{v}'"),
        },
    }
}
