use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, Utc};
use tokio::{sync::Mutex, time::Instant};

use crate::{
    error::SessionError,
    types::{Origin, PendingRequest, SessionStage, Token},
    utils,
};

/// How long a pending request may wait for the provider's callback.
pub const SESSION_TTL_MINUTES: i64 = 10;

/// Pending requests keyed by session id.
///
/// Each entry belongs to exactly one browser round trip; the id travels
/// through the OAuth `state` parameter. Cloning the store shares the map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, PendingRequest>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a request under a fresh id and returns the id.
    pub async fn create(&self, request: PendingRequest) -> String {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);

        let mut id = utils::generate_session_id();
        while sessions.contains_key(&id) {
            id = utils::generate_session_id();
        }
        sessions.insert(id.clone(), request);
        id
    }

    /// Redeems the `state` of a callback.
    ///
    /// Only a session still awaiting authorization can be claimed; it moves to
    /// [`SessionStage::Exchanging`] under the same lock, so a replayed or
    /// concurrent callback for the same id gets [`SessionError::AlreadyUsed`].
    pub async fn claim(&self, id: &str) -> Result<PendingRequest, SessionError> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);

        let request = sessions.get_mut(id).ok_or(SessionError::Unknown)?;
        match request.stage {
            SessionStage::AwaitingAuthorization => {
                request.stage = SessionStage::Exchanging;
                Ok(request.clone())
            }
            SessionStage::Exchanging | SessionStage::Authorized { .. } => {
                Err(SessionError::AlreadyUsed)
            }
        }
    }

    /// Records the access token of a claimed session.
    pub async fn authorize(&self, id: &str, token: Token) -> Result<PendingRequest, SessionError> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);

        let request = sessions.get_mut(id).ok_or(SessionError::Unknown)?;
        match request.stage {
            SessionStage::Exchanging => {
                request.stage = SessionStage::Authorized { token };
                Ok(request.clone())
            }
            SessionStage::AwaitingAuthorization => Err(SessionError::NotAuthorized),
            SessionStage::Authorized { .. } => Err(SessionError::AlreadyUsed),
        }
    }

    pub async fn get(&self, id: &str) -> Option<PendingRequest> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);
        sessions.get(id).cloned()
    }

    /// Removes an authorized session started from `origin`; a request is
    /// rendered at most once.
    ///
    /// Sessions of another origin or without a token are left in place.
    pub async fn take_authorized(
        &self,
        id: &str,
        origin: Origin,
    ) -> Result<PendingRequest, SessionError> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions);

        let request = sessions.get(id).ok_or(SessionError::Unknown)?;
        if request.origin != origin {
            return Err(SessionError::WrongOrigin);
        }
        if request.token().is_none() {
            return Err(SessionError::NotAuthorized);
        }
        sessions.remove(id).ok_or(SessionError::Unknown)
    }

    /// Polls until the callback stored a token for `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - Session id sent as the OAuth `state`
    /// * `max_wait` - Upper bound for the whole wait
    /// * `poll` - Pause between two looks at the store
    ///
    /// # Returns
    ///
    /// The token, or `None` once `max_wait` elapsed or when the session
    /// disappeared, e.g. after a failed exchange.
    pub async fn wait_for_token(
        &self,
        id: &str,
        max_wait: std::time::Duration,
        poll: std::time::Duration,
    ) -> Option<Token> {
        let start = Instant::now();

        while start.elapsed() < max_wait {
            let request = self.get(id).await?;
            if let Some(token) = request.token() {
                return Some(token.clone());
            }
            tokio::time::sleep(poll).await;
        }
        None
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.lock().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn prune(sessions: &mut HashMap<String, PendingRequest>) {
        let cutoff = Utc::now() - Duration::minutes(SESSION_TTL_MINUTES);
        sessions.retain(|_, request| request.created_at > cutoff);
    }
}
