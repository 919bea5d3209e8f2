use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Url, header::AUTHORIZATION};
use serde_json::Value;

use crate::{
    config::Settings,
    error::{ConfigError, TokenError},
    types::{OAuthErrorResponse, Token},
};

/// Builds the URL that sends the user to Spotify's consent page.
///
/// Every query value is percent-encoded, so redirect URIs with their own
/// query string or scopes containing spaces survive the round trip.
///
/// # Arguments
///
/// * `settings` - client id, redirect URI, scope and authorization endpoint
/// * `state` - opaque session id echoed back on `/callback`
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if `SPOTIFY_API_AUTH_URL` is not a URL.
///
/// # Example
///
/// ```
/// let url = build_authorization_url(&settings, "Zx81...")?;
/// // https://accounts.spotify.com/authorize?client_id=...&response_type=code&...
/// ```
pub fn build_authorization_url(settings: &Settings, state: &str) -> Result<Url, ConfigError> {
    Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", settings.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|_| ConfigError::Invalid {
        key: "SPOTIFY_API_AUTH_URL",
        value: settings.auth_url.clone(),
    })
}

/// `Basic base64(client_id:client_secret)`.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{client_id}:{client_secret}");
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Exchanges an authorization code for an access token.
///
/// Sends exactly one form-encoded POST to the token endpoint with
/// `grant_type=authorization_code`, the code and the redirect URI,
/// authenticated with the client credentials.
///
/// # Errors
///
/// - [`TokenError::Http`] / [`TokenError::Timeout`] - the request failed
/// - [`TokenError::InvalidResponse`] - the body is not JSON
/// - [`TokenError::Rejected`] - the provider answered with an OAuth error,
///   e.g. an expired or already used code (`invalid_grant`)
/// - [`TokenError::MissingAccessToken`] - no usable `access_token`
pub async fn exchange_code_for_token(
    client: &Client,
    settings: &Settings,
    code: &str,
) -> Result<Token, TokenError> {
    let res = client
        .post(&settings.token_url)
        .header(
            AUTHORIZATION,
            basic_auth_header(&settings.client_id, &settings.client_secret),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    // Error responses carry a JSON body too, so the status alone decides nothing.
    let body = res.text().await?;
    parse_token_response(&body)
}

fn parse_token_response(body: &str) -> Result<Token, TokenError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| TokenError::InvalidResponse(e.to_string()))?;

    if let Ok(err) = serde_json::from_value::<OAuthErrorResponse>(json.clone()) {
        return Err(TokenError::Rejected {
            error: err.error,
            description: err.error_description,
        });
    }

    let has_token = json["access_token"]
        .as_str()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        return Err(TokenError::MissingAccessToken);
    }

    serde_json::from_value(json).map_err(|e| TokenError::InvalidResponse(e.to_string()))
}
