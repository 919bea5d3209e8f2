//! Page templates. All interpolated values go through [`escape_html`].

use crate::{
    types::{Playlist, SortKey},
    utils::escape_html,
};

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}\
th,td{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
th{background:#1db954;color:#fff}\
.error{color:#b00020}\
.note{color:#666}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body>{body}</body></html>",
        title = escape_html(title),
    )
}

pub fn index_page(error: Option<&str>, playlist_url: &str, selected: SortKey) -> String {
    let options: String = SortKey::ALL
        .iter()
        .map(|key| {
            format!(
                "<option value=\"{value}\"{selected}>{label}</option>",
                value = key.as_str(),
                selected = if *key == selected { " selected" } else { "" },
                label = key.label(),
            )
        })
        .collect();

    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    page(
        "playsort",
        &format!(
            "<h1>Sort a Spotify playlist</h1>{error}\
             <form method=\"post\" action=\"/\">\
             <p><label>Playlist link <input type=\"url\" name=\"playlist\" size=\"60\" \
             placeholder=\"https://open.spotify.com/playlist/...\" value=\"{url}\" required></label></p>\
             <p><label>Sort by <select name=\"sort\">{options}</select></label></p>\
             <p><button type=\"submit\">Sign in with Spotify</button></p>\
             </form>",
            url = escape_html(playlist_url),
        ),
    )
}

pub fn results_page(playlist: &Playlist, sort_key: SortKey, rows: &[Vec<String>]) -> String {
    let mut table = String::from("<table>");
    for (i, row) in rows.iter().enumerate() {
        let cell = if i == 0 { "th" } else { "td" };
        table.push_str("<tr>");
        for value in row {
            table.push_str(&format!("<{cell}>{}</{cell}>", escape_html(value)));
        }
        table.push_str("</tr>");
    }
    table.push_str("</table>");

    let mut notes = String::new();
    if !playlist.skipped.is_empty() {
        notes.push_str(&format!(
            "<p class=\"note\">{} item(s) could not be read and were left out.</p>",
            playlist.skipped.len()
        ));
    }
    if playlist.dropped_trailing_item {
        notes.push_str("<p class=\"note\">The last playlist item was left out.</p>");
    }

    page(
        &playlist.name,
        &format!(
            "<h1>{name}</h1><p>Sorted by {key}, {count} track(s).</p>{notes}{table}\
             <p><a href=\"/\">Sort another playlist</a></p>",
            name = escape_html(&playlist.name),
            key = sort_key.label().to_lowercase(),
            count = playlist.tracks.len(),
        ),
    )
}

pub fn error_page(message: &str) -> String {
    page(
        "playsort - error",
        &format!(
            "<h1>Something went wrong</h1><p class=\"error\">{}</p><p><a href=\"/\">Start over</a></p>",
            escape_html(message)
        ),
    )
}

pub fn terminal_done_page() -> String {
    page(
        "playsort",
        "<h2>Authorization successful.</h2><p>Close this window and return to the terminal.</p>",
    )
}
