use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Access-token cache entry. The deadline already includes the safety
/// margin applied by the caller.
struct AccessEntry {
    token: String,
    expires_at: Instant,
}

/// In-memory token store, owned by `AppState` for the life of the process.
///
/// Refresh tokens live until overwritten or process exit. Access tokens
/// carry a deadline and stop being retrievable once it passes; reads check
/// the deadline themselves, so correctness does not depend on the sweep
/// task having run.
pub struct TokenStore {
    refresh_tokens: RwLock<HashMap<String, String>>,
    access_tokens: RwLock<HashMap<String, AccessEntry>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            refresh_tokens: RwLock::new(HashMap::new()),
            access_tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Store a refresh token, overwriting any prior value for the session.
    pub fn set_refresh_token(&self, session_id: &str, token: &str) {
        self.refresh_tokens
            .write()
            .insert(session_id.into(), token.into());
    }

    pub fn get_refresh_token(&self, session_id: &str) -> Option<String> {
        self.refresh_tokens.read().get(session_id).cloned()
    }

    /// True once the session has completed the install flow.
    pub fn is_authorized(&self, session_id: &str) -> bool {
        self.refresh_tokens.read().contains_key(session_id)
    }

    /// Cache an access token for `ttl`; afterwards lookups miss.
    pub fn set_access_token(&self, session_id: &str, token: &str, ttl: Duration) {
        self.access_tokens.write().insert(
            session_id.into(),
            AccessEntry {
                token: token.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// The cached access token, or `None` on miss or past the deadline.
    /// No side effects.
    pub fn get_access_token(&self, session_id: &str) -> Option<String> {
        let tokens = self.access_tokens.read();
        let entry = tokens.get(session_id)?;
        if entry.expires_at <= Instant::now() {
            // expired but not yet swept
            return None;
        }
        Some(entry.token.clone())
    }

    /// Drop expired access-token entries. Returns how many were evicted.
    pub fn purge_expired(&self) -> usize {
        let mut tokens = self.access_tokens.write();
        let before = tokens.len();
        let now = Instant::now();
        tokens.retain(|_, entry| entry.expires_at > now);
        before - tokens.len()
    }
}
