//! # CLI Module
//!
//! Command implementations behind the `playsort` binary.
//!
//! - [`serve`] - runs the web app: form, OAuth callback and results page.
//! - [`sort`] - runs one flow from the terminal. The consent page opens in
//!   the browser, the sorted table is printed to stdout.
//!
//! ```bash
//! playsort serve
//! playsort sort https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M --by artist
//! ```
//!
//! Both commands need the client credentials and redirect URI from the
//! environment (see [`crate::config`]). Fatal problems are reported with the
//! `error!` macro, which exits the process.

mod serve;
mod sort;

pub use serve::serve;
pub use sort::sort;
