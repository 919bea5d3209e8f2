//! Spotify Playlist Sorter Library
//!
//! Signs a user in to Spotify with the OAuth authorization-code flow, reads a
//! playlist and renders its tracks sorted by name, popularity, release date
//! or artist, either as a web page or as a terminal table.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the web app (form, callback, results)
//! - `cli` - Command implementations behind the binary
//! - `config` - Environment loading and runtime settings
//! - `error` - Typed errors of the token, fetch and sort steps
//! - `management` - Request-scoped session store
//! - `server` - Router and server start-up
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Sorting, table building and small helpers
//!
//! # Example
//!
//! ```
//! use playsort::{config, utils, types::SortKey};
//!
//! let settings = config::Settings::from_env()?;
//! let client = playsort::spotify::http_client(settings.request_timeout)?;
//! let token = playsort::spotify::auth::exchange_code_for_token(&client, &settings, code).await?;
//! let playlist = playsort::spotify::playlist::fetch_playlist(
//!     &client, &settings, &token.access_token, "https://open.spotify.com/playlist/ABC123",
//! ).await?;
//! let rows = utils::to_table(&utils::sort_tracks(&playlist.tracks, SortKey::Artist));
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for application-level glue.
///
/// The core steps return typed errors from [`error`]; server start-up and
/// the CLI collect anything else into a boxed error that stays
/// `Send + Sync` for async contexts.
///
/// # Example
///
/// ```
/// use playsort::Res;
///
/// async fn start() -> Res<()> {
///     Ok(())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line prefixed with a blue `o`.
///
/// Takes the same arguments as `println!`.
///
/// ```
/// info!("Listening on http://{}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a status line prefixed with a green checkmark.
///
/// ```
/// success!("Session {} authorized", id);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a message prefixed with a red `!` and exits with status 1.
///
/// Only for start-up and CLI failures; request handlers report errors to the
/// client instead.
///
/// ```
/// error!("Invalid configuration: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a recoverable problem prefixed with a yellow `!`.
///
/// ```
/// warning!("Skipping playlist item {}: {}", position, reason);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
