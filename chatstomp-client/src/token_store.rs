//! Session token storage
//!
//! The chat UI keeps its bearer token and per-room tokens in session
//! storage. The client takes that cache as an injected [`TokenStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Key under which the bearer token is stored
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key-value token cache
pub trait TokenStore: Send + Sync {
    /// Read a token
    fn get(&self, key: &str) -> Option<String>;

    /// Store a token, replacing any previous value
    fn set(&self, key: &str, value: &str);

    /// Forget a token
    fn remove(&self, key: &str);

    /// The stored bearer token, if any
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }
}

/// In-memory [`TokenStore`]; clones share the same tokens
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStore {
    tokens: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.tokens().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.tokens().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.tokens().remove(key);
    }
}
