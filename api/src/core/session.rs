//! In-memory per-session chat history keyed by a cookie-borne session id.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use axum::http::{HeaderMap, HeaderValue, header};
use contextor::ChatHistory;
use services::uuid::{Uuid, parse_uuid, random_uuid};
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "portfolio_session";
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

const SIGNING_CONTEXT: &str = "portfolio-chat-backend 2025 session cookie";

struct SessionEntry {
    history: ChatHistory,
    last_seen: Instant,
}

/// Session histories with idle expiry and a size cap.
///
/// Expired entries are swept on write; at capacity the least recently seen
/// session is evicted. With a secret, cookies carry a keyed `blake3` tag and
/// untagged or mis-tagged ids are treated as absent.
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
    max_sessions: usize,
    signing_key: Option<[u8; 32]>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: DEFAULT_MAX_SESSIONS,
            signing_key: None,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Signs session cookies with a key derived from `secret`.
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.signing_key = Some(blake3::derive_key(SIGNING_CONTEXT, secret.as_bytes()));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Forgets the session's history.
    pub async fn reset(&self, id: Uuid) {
        if self.inner.write().await.remove(&id).is_some() {
            debug!(session = %id, "session history cleared");
        }
    }

    /// Snapshot of the session's history; empty for unknown or expired sessions.
    pub async fn history(&self, id: Uuid) -> ChatHistory {
        let map = self.inner.read().await;
        map.get(&id)
            .filter(|e| e.last_seen.elapsed() < self.ttl)
            .map(|e| e.history.clone())
            .unwrap_or_default()
    }

    /// Appends one completed exchange, creating the session if needed.
    pub async fn append(&self, id: Uuid, user: &str, bot: &str) {
        let mut map = self.inner.write().await;
        self.sweep_locked(&mut map);
        if !map.contains_key(&id) && map.len() >= self.max_sessions {
            evict_oldest(&mut map);
        }
        let entry = map.entry(id).or_insert_with(|| SessionEntry {
            history: ChatHistory::new(),
            last_seen: Instant::now(),
        });
        entry.history.push(user, bot);
        entry.last_seen = Instant::now();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Session id from the `Cookie` header, if present and well-formed.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        let value = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value)?;

        match &self.signing_key {
            None => parse_uuid(value),
            Some(key) => {
                let (id, tag) = value.split_once('.')?;
                let tag = blake3::Hash::from_hex(tag).ok()?;
                // `blake3::Hash` equality is constant-time.
                if blake3::keyed_hash(key, id.as_bytes()) != tag {
                    warn!("session cookie with an invalid signature ignored");
                    return None;
                }
                parse_uuid(id)
            }
        }
    }

    /// Existing session id, or a fresh one.
    pub fn session_id_or_new(&self, headers: &HeaderMap) -> Uuid {
        self.session_id(headers).unwrap_or_else(random_uuid)
    }

    /// `Set-Cookie` value for the session id.
    pub fn cookie(&self, id: Uuid) -> HeaderValue {
        let value = match &self.signing_key {
            None => id.to_string(),
            Some(key) => {
                let id = id.to_string();
                let tag = blake3::keyed_hash(key, id.as_bytes());
                format!("{id}.{}", tag.to_hex())
            }
        };
        let cookie = format!(
            "{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.as_secs()
        );
        // ASCII only: uuid, hex and integers.
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    fn sweep_locked(&self, map: &mut HashMap<Uuid, SessionEntry>) {
        let before = map.len();
        map.retain(|_, e| e.last_seen.elapsed() < self.ttl);
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, "expired sessions swept");
        }
    }
}

fn evict_oldest(map: &mut HashMap<Uuid, SessionEntry>) {
    let oldest = map
        .iter()
        .min_by_key(|(_, e)| e.last_seen)
        .map(|(id, _)| *id);
    if let Some(id) = oldest {
        map.remove(&id);
        debug!(session = %id, "session store full, evicted least recently seen");
    }
}
