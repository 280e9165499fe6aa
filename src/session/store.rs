//! Key-value session store.

use dashmap::DashMap;

/// Well-known key holding the bearer token attached to upstream calls.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key-value store for per-deployment session state.
///
/// Implementations decide the medium; callers only see the interface.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn insert(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory store used by default and in tests.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn insert(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove_roundtrip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get(AUTH_TOKEN_KEY), None);

        store.insert(AUTH_TOKEN_KEY, "svc-token".to_string());
        assert_eq!(store.get(AUTH_TOKEN_KEY), Some("svc-token".to_string()));

        store.insert(AUTH_TOKEN_KEY, "rotated".to_string());
        assert_eq!(store.get(AUTH_TOKEN_KEY), Some("rotated".to_string()));

        store.remove(AUTH_TOKEN_KEY);
        assert_eq!(store.get(AUTH_TOKEN_KEY), None);
    }
}
