use std::time::Duration;

use playsort::error::SessionError;
use playsort::management::{SESSION_TTL_MINUTES, SessionStore};
use playsort::types::{Origin, PendingRequest, SortKey, Token};

fn request(origin: Origin) -> PendingRequest {
    PendingRequest::new(
        "https://open.spotify.com/playlist/ABC123".to_string(),
        SortKey::Popularity,
        origin,
    )
}

fn token() -> Token {
    Token {
        access_token: "BQC".to_string(),
        token_type: Some("Bearer".to_string()),
        scope: None,
        expires_in: Some(3600),
        refresh_token: None,
    }
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let store = SessionStore::new();
    let a = store.create(request(Origin::Browser)).await;
    let mut other = request(Origin::Browser);
    other.sort_key = SortKey::Artist;
    let b = store.create(other).await;

    assert_ne!(a, b);
    assert_eq!(store.get(&a).await.unwrap().sort_key, SortKey::Popularity);
    assert_eq!(store.get(&b).await.unwrap().sort_key, SortKey::Artist);
}

#[tokio::test]
async fn test_claim_authorize_then_take() {
    let store = SessionStore::new();
    let id = store.create(request(Origin::Browser)).await;
    assert!(store.get(&id).await.unwrap().token().is_none());

    store.claim(&id).await.unwrap();
    let authorized = store.authorize(&id, token()).await.unwrap();
    assert_eq!(authorized.token().unwrap().access_token, "BQC");

    assert!(store.take_authorized(&id, Origin::Browser).await.is_ok());
    assert_eq!(
        store.take_authorized(&id, Origin::Browser).await.unwrap_err(),
        SessionError::Unknown
    );
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_state_is_claimed_once() {
    let store = SessionStore::new();
    let id = store.create(request(Origin::Browser)).await;

    assert!(store.claim(&id).await.is_ok());
    // While the exchange is running
    assert_eq!(store.claim(&id).await.unwrap_err(), SessionError::AlreadyUsed);

    store.authorize(&id, token()).await.unwrap();
    // After the token was stored
    assert_eq!(store.claim(&id).await.unwrap_err(), SessionError::AlreadyUsed);
    assert_eq!(
        store.authorize(&id, token()).await.unwrap_err(),
        SessionError::AlreadyUsed
    );
}

#[tokio::test]
async fn test_concurrent_claims_admit_one_callback() {
    let store = SessionStore::new();
    let id = store.create(request(Origin::Browser)).await;

    let (first, second) = tokio::join!(store.claim(&id), store.claim(&id));
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );
}

#[tokio::test]
async fn test_unclaimed_session_cannot_be_authorized() {
    let store = SessionStore::new();
    assert_eq!(
        store.authorize("missing", token()).await.unwrap_err(),
        SessionError::Unknown
    );

    let id = store.create(request(Origin::Browser)).await;
    assert_eq!(
        store.authorize(&id, token()).await.unwrap_err(),
        SessionError::NotAuthorized
    );
}

#[tokio::test]
async fn test_take_authorized_keeps_rejected_sessions() {
    let store = SessionStore::new();

    let pending = store.create(request(Origin::Browser)).await;
    assert_eq!(
        store
            .take_authorized(&pending, Origin::Browser)
            .await
            .unwrap_err(),
        SessionError::NotAuthorized
    );
    assert!(store.get(&pending).await.is_some());

    let terminal = store.create(request(Origin::Terminal)).await;
    store.claim(&terminal).await.unwrap();
    store.authorize(&terminal, token()).await.unwrap();
    assert_eq!(
        store
            .take_authorized(&terminal, Origin::Browser)
            .await
            .unwrap_err(),
        SessionError::WrongOrigin
    );
    assert!(store.get(&terminal).await.unwrap().token().is_some());
}

#[tokio::test]
async fn test_wait_for_token_sees_late_authorization() {
    let store = SessionStore::new();
    let id = store.create(request(Origin::Terminal)).await;

    let callback = {
        let store = store.clone();
        let id = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.claim(&id).await.unwrap();
            store.authorize(&id, token()).await.unwrap();
        })
    };

    let token = store
        .wait_for_token(&id, Duration::from_secs(5), Duration::from_millis(10))
        .await;
    callback.await.unwrap();
    assert_eq!(token.unwrap().access_token, "BQC");
}

#[tokio::test]
async fn test_wait_for_token_gives_up() {
    let store = SessionStore::new();
    let id = store.create(request(Origin::Terminal)).await;

    let token = store
        .wait_for_token(&id, Duration::from_millis(50), Duration::from_millis(10))
        .await;
    assert!(token.is_none());

    // A dropped session ends the wait immediately
    store.remove(&id).await;
    let token = store
        .wait_for_token(&id, Duration::from_secs(60), Duration::from_millis(10))
        .await;
    assert!(token.is_none());
}

#[tokio::test]
async fn test_expired_sessions_are_pruned() {
    let store = SessionStore::new();
    let mut stale = request(Origin::Browser);
    stale.created_at = chrono::Utc::now() - chrono::Duration::minutes(SESSION_TTL_MINUTES + 1);
    let id = store.create(stale).await;

    assert!(store.get(&id).await.is_none());
    assert_eq!(store.claim(&id).await.unwrap_err(), SessionError::Unknown);
}
