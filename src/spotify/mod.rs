//! # Spotify Integration Module
//!
//! The two provider conversations playsort needs:
//!
//! - [`auth`] - builds the consent URL and exchanges the authorization code
//!   for an access token (client-secret flow, `Authorization: Basic`).
//! - [`playlist`] - resolves a playlist link and reads the first page of the
//!   playlist with the access token.
//!
//! ```text
//! Browser ── consent ──> accounts.spotify.com/authorize
//!    │                              │
//!    └──── /callback?code&state <───┘
//!               │
//!               ├── POST accounts.spotify.com/api/token   (auth)
//!               └── GET  api.spotify.com/v1/playlists/{id} (playlist)
//! ```
//!
//! Every request goes through a client built by [`http_client`], which
//! carries an explicit timeout. Nothing is retried; timeouts and HTTP
//! failures come back as typed errors from [`crate::error`].

use std::time::Duration;

use reqwest::Client;

pub mod auth;
pub mod playlist;

/// Builds the shared HTTP client with a whole-request timeout.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
