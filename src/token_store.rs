//! Token storage capability
//!
//! The browser original keeps tokens in `localStorage`; here storage is an
//! injected capability so embeddings can plug in whatever backs their
//! key-value store, and tests can substitute an in-memory one.

use papaya::HashMap;
use std::sync::Arc;

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "token";
/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// String key-value storage for authentication tokens
pub trait TokenStore: Send + Sync {
    /// Get the value stored under a key
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value under a key, overwriting any previous value
    fn set(&self, key: &str, value: &str);

    /// Remove the value stored under a key
    fn remove(&self, key: &str);
}

/// Thread-safe in-memory token store using Papaya HashMap
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.pin().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.pin().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.pin().remove(key);
    }
}
