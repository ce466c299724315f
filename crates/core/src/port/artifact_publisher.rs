// Artifact Publisher Port
// Uploads one trained artifact to a remote registry

use crate::domain::HubToken;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// What to upload and where (always a model repository)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUpload {
    pub local_path: PathBuf,
    pub path_in_repo: String,
    pub repo_id: String,
}

/// Registry acknowledgement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Browsable repository URL
    pub repo_url: String,
    pub commit_url: Option<String>,
    pub commit_oid: Option<String>,
}

/// Publish errors
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Artifact not found: {0}")]
    ArtifactMissing(String),

    #[error("Registry rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),

    #[error("Registry ignores path {0} in this repository")]
    PathIgnored(String),

    #[error("Large file transfer failed: {0}")]
    LfsTransfer(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Artifact Publisher trait
///
/// Implementations:
/// - HubPublisher: HTTP commit against a Hugging Face compatible hub
#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Upload the artifact authenticated as `token`
    async fn publish(
        &self,
        upload: &ArtifactUpload,
        token: &HubToken,
    ) -> Result<PublishReceipt, PublishError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every upload; optionally rejects them
    pub struct MockArtifactPublisher {
        reject_status: Option<u16>,
        uploads: Mutex<Vec<(ArtifactUpload, HubToken)>>,
    }

    impl MockArtifactPublisher {
        pub fn new_success() -> Self {
            Self {
                reject_status: None,
                uploads: Mutex::new(Vec::new()),
            }
        }
        pub fn new_rejecting(status: u16) -> Self {
            Self {
                reject_status: Some(status),
                uploads: Mutex::new(Vec::new()),
            }
        }
        pub fn call_count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
        pub fn uploads(&self) -> Vec<(ArtifactUpload, HubToken)> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactPublisher for MockArtifactPublisher {
        async fn publish(
            &self,
            upload: &ArtifactUpload,
            token: &HubToken,
        ) -> Result<PublishReceipt, PublishError> {
            self.uploads
                .lock()
                .unwrap()
                .push((upload.clone(), token.clone()));

            if let Some(status) = self.reject_status {
                return Err(PublishError::Rejected {
                    status,
                    body: "mock rejection".to_string(),
                });
            }

            Ok(PublishReceipt {
                repo_url: format!("https://hub.test/{}", upload.repo_id),
                commit_url: None,
                commit_oid: None,
            })
        }
    }
}
