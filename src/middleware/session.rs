//! Server-side sessions behind a signed cookie.
//!
//! Loading and persisting is done by [`actix_session::SessionMiddleware`]; the
//! cookie only carries the signed session key, the state itself lives in a
//! [`MemorySessionStore`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_session::SessionMiddleware;
use actix_web::cookie::{time::Duration, Key, SameSite};
use anyhow::Context;
use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::SessionSettings;

const SESSION_KEY_LEN: usize = 64;

type SessionState = HashMap<String, String>;

struct StoredSession {
    state: SessionState,
    expires_at: Instant,
}

impl StoredSession {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-local session store. Sessions do not survive a restart.
///
/// Clones share the same map, so every worker sees every session.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones not yet evicted included.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `state` under `key`, evicting every expired entry on the way.
    fn put(&self, key: &str, state: SessionState, ttl: &Duration) {
        let now = Instant::now();
        let ttl = std::time::Duration::try_from(*ttl).unwrap_or_default();
        let mut sessions = self.sessions.write();
        sessions.retain(|_, stored| stored.is_live(now));
        sessions.insert(
            key.to_owned(),
            StoredSession {
                state,
                expires_at: now + ttl,
            },
        );
    }

    fn is_live(&self, key: &str) -> bool {
        self.sessions
            .read()
            .get(key)
            .map(|stored| stored.is_live(Instant::now()))
            .unwrap_or(false)
    }
}

fn generate_session_key() -> Result<SessionKey, anyhow::Error> {
    let key: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LEN)
        .map(char::from)
        .collect();
    SessionKey::try_from(key).map_err(|_| anyhow::anyhow!("Generated an invalid session key."))
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let now = Instant::now();
        Ok(self
            .sessions
            .read()
            .get(session_key.as_ref())
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.state.clone()))
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        let session_key = generate_session_key().map_err(SaveError::Other)?;
        self.put(session_key.as_ref(), session_state, ttl);
        Ok(session_key)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        // The session expired while the request was in flight: start a new one.
        let session_key = if self.is_live(session_key.as_ref()) {
            session_key
        } else {
            generate_session_key().map_err(UpdateError::Other)?
        };
        self.put(session_key.as_ref(), session_state, ttl);
        Ok(session_key)
    }

    async fn update_ttl(
        &self,
        session_key: &SessionKey,
        ttl: &Duration,
    ) -> Result<(), anyhow::Error> {
        let ttl = std::time::Duration::try_from(*ttl)?;
        if let Some(stored) = self.sessions.write().get_mut(session_key.as_ref()) {
            stored.expires_at = Instant::now() + ttl;
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.sessions.write().remove(session_key.as_ref());
        Ok(())
    }
}

/// Everything needed to mount the session middleware on each worker.
#[derive(Clone)]
pub struct SessionLayer {
    store: MemorySessionStore,
    key: Key,
    settings: SessionSettings,
}

impl std::fmt::Debug for SessionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLayer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SessionLayer {
    pub fn new(
        store: MemorySessionStore,
        secret: &Secret<String>,
        settings: &SessionSettings,
    ) -> Result<Self, anyhow::Error> {
        let key = Key::try_from(secret.expose_secret().as_bytes())
            .context("The session secret must be at least 64 bytes long.")?;
        Ok(Self {
            store,
            key,
            settings: settings.clone(),
        })
    }

    pub fn middleware(&self) -> SessionMiddleware<MemorySessionStore> {
        let ttl = i64::try_from(self.settings.lifetime_hours).unwrap_or(i64::MAX / 3600);
        SessionMiddleware::builder(self.store.clone(), self.key.clone())
            .cookie_name(self.settings.cookie_name.clone())
            .cookie_path("/".to_owned())
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .cookie_secure(self.settings.secure_cookie)
            .cookie_content_security(CookieContentSecurity::Signed)
            .session_lifecycle(PersistentSession::default().session_ttl(Duration::hours(ttl)))
            .build()
    }
}
