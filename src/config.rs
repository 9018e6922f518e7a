//! Configuration management for txttoytmusic.
//!
//! Settings come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in `<data_local_dir>/txttoytmusic/`
//! 3. Built-in defaults
//!
//! Command-line flags are handled separately by the config resolver in
//! [`crate::cli`]; everything here is about the environment the tool runs in.

use std::{env, path::PathBuf, time::Duration};

use crate::{error::ConfigError, types::Privacy};

pub const DEFAULT_API_URL: &str = "https://music.youtube.com/youtubei/v1";
pub const DEFAULT_ORIGIN: &str = "https://music.youtube.com";
pub const DEFAULT_CLIENT_VERSION: &str = "1.20241023.01.00";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DUPLICATES_FILE: &str = "songs_duplicates.txt";

/// Loads environment variables from `<data_local_dir>/txttoytmusic/.env`.
///
/// A missing file is not an error; variables already present in the process
/// environment are never overwritten.
///
/// # Errors
///
/// Returns an error string if the file exists but cannot be parsed.
pub fn load_env() -> Result<(), String> {
    let path = env_file_path();
    if !path.is_file() {
        tracing::debug!("no env file at {}", path.display());
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("txttoytmusic/.env");
    path
}

/// Base URL of the InnerTube API, without a trailing slash.
pub fn api_url() -> String {
    env::var("TXTTOYTMUSIC_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Origin used for the `origin` header and the SAPISIDHASH.
pub fn origin() -> String {
    env::var("TXTTOYTMUSIC_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string())
}

pub fn client_version() -> String {
    env::var("TXTTOYTMUSIC_CLIENT_VERSION").unwrap_or_else(|_| DEFAULT_CLIENT_VERSION.to_string())
}

pub fn log_dir() -> PathBuf {
    env::var("TXTTOYTMUSIC_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR))
}

/// Privacy used when neither a flag nor a prompt decides it.
///
/// # Errors
///
/// Fails with [`ConfigError::InvalidPrivacy`] when the variable is set to
/// something other than public, private or unlisted.
pub fn default_privacy() -> Result<Option<Privacy>, ConfigError> {
    match env::var("TXTTOYTMUSIC_DEFAULT_PRIVACY") {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Privacy::parse(&value)
            .map(Some)
            .ok_or(ConfigError::InvalidPrivacy(value)),
        Err(_) => Ok(None),
    }
}

/// Retry behaviour for playlist edits rejected with a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(6),
        }
    }
}

/// Runtime settings that are not part of the per-run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_dir: PathBuf,
    pub duplicates_file: Option<PathBuf>,
    pub default_privacy: Option<Privacy>,
    pub retry: RetryPolicy,
    pub show_progress: bool,
    pub open_browser: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            log_dir: log_dir(),
            duplicates_file: Some(PathBuf::from(DUPLICATES_FILE)),
            default_privacy: default_privacy()?,
            retry: RetryPolicy::default(),
            show_progress: true,
            open_browser: true,
        })
    }
}
