//! In-memory cookie-session store: opaque token to uid.
//!
//! Sessions live for the life of the process only; there is deliberately no
//! persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh session token for a uid.
    pub fn issue(&self, uid: String) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .insert(token, uid);
        token
    }

    /// Looks up the uid behind a token, if the session is still live.
    pub fn resolve(&self, token: Uuid) -> Option<String> {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .get(&token)
            .cloned()
    }

    pub fn revoke(&self, token: Uuid) {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .remove(&token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_resolves_to_uid() {
        let store = SessionStore::new();
        let token = store.issue("uid-1".to_string());
        assert_eq!(store.resolve(token), Some("uid-1".to_string()));
    }

    #[test]
    fn test_unknown_token_does_not_resolve() {
        let store = SessionStore::new();
        assert_eq!(store.resolve(Uuid::new_v4()), None);
    }

    #[test]
    fn test_revoked_token_stops_resolving() {
        let store = SessionStore::new();
        let token = store.issue("uid-1".to_string());
        store.revoke(token);
        assert_eq!(store.resolve(token), None);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let store = SessionStore::new();
        let first = store.issue("uid-1".to_string());
        let second = store.issue("uid-1".to_string());
        assert_ne!(first, second);
    }
}
