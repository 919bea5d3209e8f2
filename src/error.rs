//! Error types for the authorization, fetch and sort steps.
//!
//! Provider failures are never retried: each step surfaces a typed error and
//! the web layer turns it into an error page.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures while exchanging an authorization code for an access token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("token request timed out")]
    Timeout,

    #[error("token endpoint returned a body that is not valid JSON: {0}")]
    InvalidResponse(String),

    /// The provider answered with an OAuth error object, e.g. `invalid_grant`.
    #[error("authorization was rejected: {error}")]
    Rejected {
        error: String,
        description: Option<String>,
    },

    /// An absent and an empty `access_token` are the same failure.
    #[error("token response did not contain an access token")]
    MissingAccessToken,
}

impl From<reqwest::Error> for TokenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TokenError::Timeout
        } else {
            TokenError::Http(err)
        }
    }
}

/// Failures while reading a playlist from the Web API.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("'{0}' is not a Spotify playlist link")]
    InvalidPlaylistUrl(String),

    #[error("playlist request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("playlist request timed out")]
    Timeout,

    #[error("playlist request returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("playlist response has an unexpected shape: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(err)
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid sort key '{0}', expected one of: name, popularity, date, artist")]
pub struct InvalidSortKeyError(pub String);

/// Raised at start-up when the environment is incomplete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// A session id that cannot take the requested step.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown or expired session. Please submit the playlist again.")]
    Unknown,

    /// The `state` was already redeemed by an earlier callback.
    #[error("This sign-in link was already used. Please submit the playlist again.")]
    AlreadyUsed,

    #[error("This session has not been authorized yet.")]
    NotAuthorized,

    /// A `playsort sort` session reached a browser-only route.
    #[error("This session belongs to the terminal and cannot be shown here.")]
    WrongOrigin,
}
