//! In-memory token store for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::traits::{TokenStore, TokenStoreError};

/// In-memory token store for testing.
///
/// Clones share state, so a test can keep one clone and hand the other to
/// the code under test.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    /// Stored token
    token: Arc<Mutex<Option<String>>>,
    /// Number of successful writes
    writes: Arc<Mutex<usize>>,
    /// Whether save should fail
    save_should_fail: Arc<Mutex<bool>>,
    /// Whether load should fail
    load_should_fail: Arc<Mutex<bool>>,
    /// Whether clear should fail
    clear_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`. Does not count as a write.
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        *store.token.lock().unwrap() = Some(token.to_string());
        store
    }

    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    pub fn set_clear_should_fail(&self, should_fail: bool) {
        *self.clear_should_fail.lock().unwrap() = should_fail;
    }

    /// Successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    /// Raw slot contents, bypassing the empty-means-absent rule.
    pub fn raw_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self) -> Result<Option<String>, TokenStoreError> {
        if *self.load_should_fail.lock().unwrap() {
            return Err(TokenStoreError::LoadFailed("Mock load failure".to_string()));
        }
        Ok(self.token.lock().unwrap().clone().filter(|t| !t.is_empty()))
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        if *self.save_should_fail.lock().unwrap() {
            return Err(TokenStoreError::SaveFailed("Mock save failure".to_string()));
        }
        *self.token.lock().unwrap() = Some(token.to_string());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        if *self.clear_should_fail.lock().unwrap() {
            return Err(TokenStoreError::ClearFailed("Mock clear failure".to_string()));
        }
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
