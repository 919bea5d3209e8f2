//! Web flow tests: form -> consent redirect -> callback -> results.

use std::{collections::HashMap, sync::Arc, time::Duration};

use playsort::config::Settings;
use playsort::management::SessionStore;
use playsort::server::{AppState, router};
use playsort::types::{Origin, PendingRequest, SortKey};
use reqwest::{StatusCode, Url, header::LOCATION, redirect::Policy};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    base: String,
    http: reqwest::Client,
    sessions: SessionStore,
    provider: MockServer,
}

async fn spawn_app() -> TestApp {
    let provider = MockServer::start().await;
    let env: HashMap<&str, &str> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client-id"),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET", "client-secret"),
        ("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
    ]);
    let settings = Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()))
        .unwrap()
        .with_provider_base(&provider.uri());

    let sessions = SessionStore::new();
    let state = Arc::new(AppState::new(settings, sessions.clone()).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    TestApp {
        base: format!("http://{}", addr),
        http: reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap(),
        sessions,
        provider,
    }
}

impl TestApp {
    async fn submit(&self, playlist: &str, sort: &str) -> reqwest::Response {
        self.http
            .post(format!("{}/", self.base))
            .form(&[("playlist", playlist), ("sort", sort)])
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{}", self.base, path_and_query))
            .send()
            .await
            .unwrap()
    }
}

fn location(res: &reqwest::Response) -> String {
    res.headers()[LOCATION].to_str().unwrap().to_string()
}

fn state_of(res: &reqwest::Response) -> String {
    Url::parse(&location(res))
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap()
}

async fn mount_provider(provider: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "BQC-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(provider)
        .await;

    let track = |name: &str, popularity: u32| {
        json!({
            "track": {
                "name": name,
                "popularity": popularity,
                "uri": format!("spotify:track:{name}"),
                "album": { "name": "Album", "release_date": "2020-02-02" },
                "artists": [{ "name": "Artist" }]
            }
        })
    };

    Mock::given(method("GET"))
        .and(path("/v1/playlists/ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Rock & Roll <Classics>",
            "tracks": { "items": [track("Low", 10), track("High", 90), track("Mid", 50)] }
        })))
        .mount(provider)
        .await;
}

#[tokio::test]
async fn test_full_browser_flow() {
    let app = spawn_app().await;
    mount_provider(&app.provider).await;

    let res = app
        .submit("https://open.spotify.com/playlist/ABC123", "popularity")
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let consent = Url::parse(&location(&res)).unwrap();
    assert_eq!(consent.path(), "/authorize");
    let params: HashMap<String, String> = consent.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], "client-id");
    assert_eq!(params["response_type"], "code");
    let session = params["state"].clone();
    assert_eq!(app.sessions.len().await, 1);

    let res = app
        .get(&format!("/callback?code=AQD-code&state={}", session))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/results?session={}", session));

    let res = app.get(&format!("/results?session={}", session)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();

    assert!(body.contains("Rock &amp; Roll &lt;Classics&gt;"));
    assert!(body.contains("<th>Popularity Score</th>"));
    let high = body.find("<td>High</td>").unwrap();
    let mid = body.find("<td>Mid</td>").unwrap();
    let low = body.find("<td>Low</td>").unwrap();
    assert!(high < mid && mid < low);

    // Sessions are consumed once rendered
    assert_eq!(app.sessions.len().await, 0);
    let res = app.get(&format!("/results?session={}", session)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_sessions_keep_their_own_choices() {
    let app = spawn_app().await;

    let a = app
        .submit("https://open.spotify.com/playlist/ABC123", "name")
        .await;
    let b = app
        .submit("https://open.spotify.com/playlist/DEF456", "artist")
        .await;

    let (sa, sb) = (state_of(&a), state_of(&b));
    assert_ne!(sa, sb);

    let pa = app.sessions.get(&sa).await.unwrap();
    let pb = app.sessions.get(&sb).await.unwrap();
    assert_eq!(pa.playlist_url, "https://open.spotify.com/playlist/ABC123");
    assert_eq!(pb.playlist_url, "https://open.spotify.com/playlist/DEF456");
    assert_ne!(pa.sort_key, pb.sort_key);
}

#[tokio::test]
async fn test_submit_rejects_bad_input() {
    let app = spawn_app().await;

    let res = app
        .submit("https://open.spotify.com/playlist/ABC123", "tempo")
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().contains("invalid sort key"));

    let res = app.submit("https://example.com/whatever", "name").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.sessions.len().await, 0);
}

#[tokio::test]
async fn test_callback_errors() {
    let app = spawn_app().await;

    let res = app.get("/callback?code=abc&state=unknown").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.get("/callback?code=abc").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .submit("https://open.spotify.com/playlist/ABC123", "date")
        .await;
    let session = state_of(&res);

    let res = app
        .get(&format!("/callback?error=access_denied&state={}", session))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(app.sessions.get(&session).await.is_none());
}

#[tokio::test]
async fn test_failed_token_exchange_drops_session() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })),
        )
        .mount(&app.provider)
        .await;

    let res = app
        .submit("https://open.spotify.com/playlist/ABC123", "name")
        .await;
    let session = state_of(&res);

    let res = app
        .get(&format!("/callback?code=stale&state={}", session))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(res.text().await.unwrap().contains("invalid_grant"));
    assert!(app.sessions.get(&session).await.is_none());
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;
    let res = app.get("/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["pending_sessions"], 0);

    app.submit("https://open.spotify.com/playlist/ABC123", "name")
        .await;
    let body: serde_json::Value = app.get("/health").await.json().await.unwrap();
    assert_eq!(body["pending_sessions"], 1);
}

#[tokio::test]
async fn test_replayed_callback_is_rejected() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "BQC-token",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&app.provider)
        .await;

    let res = app
        .submit("https://open.spotify.com/playlist/ABC123", "name")
        .await;
    let session = state_of(&res);

    let res = app
        .get(&format!("/callback?code=AQD-code&state={}", session))
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    // Same state again, e.g. a reload of the callback page
    let res = app
        .get(&format!("/callback?code=AQD-other&state={}", session))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().contains("already used"));

    // The first authorization is still intact
    let pending = app.sessions.get(&session).await.unwrap();
    assert_eq!(pending.token().unwrap().access_token, "BQC-token");
    // `.expect(1)` on the token mock is verified when the provider drops
}

#[tokio::test]
async fn test_results_require_an_authorized_browser_session() {
    let app = spawn_app().await;

    let res = app
        .submit("https://open.spotify.com/playlist/ABC123", "name")
        .await;
    let session = state_of(&res);

    let res = app.get(&format!("/results?session={}", session)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().contains("not been authorized"));
    // Not consumed: the sign-in can still complete
    assert!(app.sessions.get(&session).await.is_some());
}

#[tokio::test]
async fn test_terminal_session_flow() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "BQC-terminal",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&app.provider)
        .await;
    // The terminal fetches the playlist itself; the server never should
    Mock::given(method("GET"))
        .and(path("/v1/playlists/ABC123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.provider)
        .await;

    let session = app
        .sessions
        .create(PendingRequest::new(
            "https://open.spotify.com/playlist/ABC123".to_string(),
            SortKey::Date,
            Origin::Terminal,
        ))
        .await;

    let res = app
        .get(&format!("/callback?code=AQD-code&state={}", session))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("return to the terminal"));

    let pending = app.sessions.get(&session).await.unwrap();
    assert_eq!(pending.token().unwrap().access_token, "BQC-terminal");

    // Guessing the state does not reveal the playlist in a browser
    let res = app.get(&format!("/results?session={}", session)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.text().await.unwrap().contains("belongs to the terminal"));
    assert!(app.sessions.get(&session).await.is_some());

    let token = app
        .sessions
        .wait_for_token(&session, Duration::from_secs(1), Duration::from_millis(10))
        .await;
    assert_eq!(token.unwrap().access_token, "BQC-terminal");
}
