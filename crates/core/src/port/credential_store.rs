// Credential Store Port
// Persisted token the registry client authenticates with

use crate::domain::HubToken;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Token store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persisted credential store
///
/// Saving always overwrites: the store holds exactly one token.
pub trait CredentialStore: Send + Sync {
    fn save(&self, token: &HubToken) -> Result<(), CredentialError>;

    fn load(&self) -> Result<Option<HubToken>, CredentialError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store that keeps the save history
    #[derive(Default)]
    pub struct InMemoryCredentialStore {
        saved: Mutex<Vec<HubToken>>,
    }

    impl InMemoryCredentialStore {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn history(&self) -> Vec<HubToken> {
            self.saved.lock().unwrap().clone()
        }
    }

    impl CredentialStore for InMemoryCredentialStore {
        fn save(&self, token: &HubToken) -> Result<(), CredentialError> {
            self.saved.lock().unwrap().push(token.clone());
            Ok(())
        }

        fn load(&self) -> Result<Option<HubToken>, CredentialError> {
            Ok(self.saved.lock().unwrap().last().cloned())
        }
    }

    /// Store that always fails (read-only home, etc.)
    pub struct FailingCredentialStore;

    impl CredentialStore for FailingCredentialStore {
        fn save(&self, _token: &HubToken) -> Result<(), CredentialError> {
            Err(CredentialError::Unavailable("read-only".to_string()))
        }

        fn load(&self) -> Result<Option<HubToken>, CredentialError> {
            Ok(None)
        }
    }
}
