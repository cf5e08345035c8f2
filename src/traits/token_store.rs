//! Token store trait abstraction.
//!
//! One logical slot holding the music user token. Last write wins; an empty
//! value reads back as absent.

use async_trait::async_trait;

/// Token store operation errors.
#[derive(Debug, Clone)]
pub enum TokenStoreError {
    /// Failed to read the token
    LoadFailed(String),
    /// Failed to write the token
    SaveFailed(String),
    /// Failed to clear the token
    ClearFailed(String),
    /// Serialization/deserialization error
    Serialization(String),
}

impl std::fmt::Display for TokenStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStoreError::LoadFailed(msg) => write!(f, "Failed to load token: {}", msg),
            TokenStoreError::SaveFailed(msg) => write!(f, "Failed to save token: {}", msg),
            TokenStoreError::ClearFailed(msg) => write!(f, "Failed to clear token: {}", msg),
            TokenStoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for TokenStoreError {}

/// Trait for music user token persistence.
///
/// # Example
///
/// ```ignore
/// use musiclink::traits::TokenStore;
///
/// async fn signed_in<S: TokenStore>(store: &S) -> bool {
///     matches!(store.get().await, Ok(Some(_)))
/// }
/// ```
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored token.
    ///
    /// # Returns
    /// - `Ok(Some(token))` if a non-empty token is stored
    /// - `Ok(None)` if nothing (or an empty string) is stored
    /// - `Err(error)` if reading failed
    async fn get(&self) -> Result<Option<String>, TokenStoreError>;

    /// Overwrite the stored token.
    async fn set(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), TokenStoreError>;
}
