use std::cmp::Ordering;

use rand::{Rng, distr::Alphanumeric};

use crate::{
    error::InvalidSortKeyError,
    types::{SortKey, Track, TrackTableRow},
};

pub const TABLE_HEADER: [&str; 5] = [
    "Track Name",
    "Artist",
    "Album",
    "Release Date",
    "Popularity Score",
];

/// Random identifier for a pending request, sent to the provider as the
/// OAuth `state` parameter.
pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Parses a sort selector as submitted by the form or the CLI.
pub fn parse_sort_key(s: &str) -> Result<SortKey, InvalidSortKeyError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "name" => Ok(SortKey::Name),
        "popularity" => Ok(SortKey::Popularity),
        "date" => Ok(SortKey::Date),
        "artist" => Ok(SortKey::Artist),
        _ => Err(InvalidSortKeyError(s.to_string())),
    }
}

/// Returns the tracks ordered by `key`; the input is left untouched.
///
/// - `Name`, `Popularity`, `Date`: descending.
/// - `Artist`: ascending by artist, then release date.
///
/// The sort is stable, so equal keys keep their playlist order.
pub fn sort_tracks(tracks: &[Track], key: SortKey) -> Vec<Track> {
    let mut sorted = tracks.to_vec();
    sorted.sort_by(|a, b| compare_tracks(a, b, key));
    sorted
}

fn compare_tracks(a: &Track, b: &Track, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => b.name.cmp(&a.name),
        SortKey::Popularity => b.popularity.cmp(&a.popularity),
        // ISO-8601 strings order lexicographically, year-only dates included
        SortKey::Date => b.release_date.cmp(&a.release_date),
        SortKey::Artist => match a.artist.cmp(&b.artist) {
            Ordering::Equal => a.release_date.cmp(&b.release_date),
            other => other,
        },
    }
}

/// Header row followed by one row per track, in the given order.
pub fn to_table(tracks: &[Track]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(tracks.len() + 1);
    rows.push(TABLE_HEADER.iter().map(|h| h.to_string()).collect());
    rows.extend(tracks.iter().map(|t| {
        vec![
            t.name.clone(),
            t.artist.clone(),
            t.album.clone(),
            t.release_date.clone(),
            t.popularity.to_string(),
        ]
    }));
    rows
}

/// Typed rows for `tabled::Table`, same column order as [`to_table`].
pub fn to_table_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks.iter().map(TrackTableRow::from).collect()
}

/// Escapes text for HTML element content and quoted attribute values.
///
/// Playlist, track and artist names come from the provider and are always
/// passed through here before they reach a page.
///
/// # Arguments
///
/// * `input` - Raw text
///
/// # Example
///
/// ```
/// assert_eq!(escape_html("Rock & Roll <Live>"), "Rock &amp; Roll &lt;Live&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
