//! Configuration management for playsort.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file. The lookup order is:
//! 1. Environment variables already set in the process (highest priority)
//! 2. `.env` file in the local data directory (`playsort/.env`)
//! 3. `.env` file in the current working directory
//! 4. Application defaults for everything except the client credentials

use std::{env, path::PathBuf, time::Duration};

use crate::{error::ConfigError, types::TrailingItemPolicy};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_SCOPE: &str = "playlist-read-private";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Loads environment variables from `.env` files.
///
/// Creates the local data directory if needed, then loads
/// `<data dir>/playsort/.env` and a `.env` in the working directory. Neither
/// file is required: the variables may just as well be exported by the shell.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/playsort/.env`
/// - macOS: `~/Library/Application Support/playsort/.env`
/// - Windows: `%LOCALAPPDATA%/playsort/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or if one of the
/// files exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playsort/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }

    match dotenv::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Runtime settings for the OAuth flow, the Web API client and the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub request_timeout: Duration,
    pub trailing_item_policy: TrailingItemPolicy,
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup.
    ///
    /// Blank values count as unset. The client id, client secret and
    /// redirect URI are required; everything else falls back to a default.
    /// The three provider endpoints must be absolute URLs.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "REQUEST_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        // Provider endpoints must be absolute URLs at start-up.
        let endpoint = |key: &'static str, default: &str| {
            let value = or_default(key, default);
            match reqwest::Url::parse(&value) {
                Ok(url) if url.has_host() => Ok(value),
                _ => Err(ConfigError::Invalid { key, value }),
            }
        };
        let auth_url = endpoint("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)?;
        let token_url = endpoint("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)?;
        let api_url = endpoint("SPOTIFY_API_URL", DEFAULT_API_URL)?
            .trim_end_matches('/')
            .to_string();

        let trailing_item_policy = match get("PLAYLIST_DROP_LAST_ITEM") {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => TrailingItemPolicy::DropLast,
                "0" | "false" | "no" => TrailingItemPolicy::KeepAll,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PLAYLIST_DROP_LAST_ITEM",
                        value,
                    });
                }
            },
            None => TrailingItemPolicy::KeepAll,
        };

        Ok(Settings {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url,
            token_url,
            api_url,
            server_addr: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            request_timeout,
            trailing_item_policy,
        })
    }

    /// Settings pointing every endpoint at `base`; used against mock providers.
    pub fn with_provider_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{base}/authorize");
        self.token_url = format!("{base}/api/token");
        self.api_url = base.to_string();
        self
    }
}
