// Port Layer - Interfaces for external dependencies

pub mod artifact_publisher;
pub mod credential_store;
pub mod id_provider; // For deterministic testing
pub mod job_launcher;
pub mod time_provider;

// Re-exports
pub use artifact_publisher::{ArtifactPublisher, ArtifactUpload, PublishError, PublishReceipt};
pub use credential_store::{CredentialError, CredentialStore};
pub use id_provider::IdProvider;
pub use job_launcher::{ExecutionError, JobLauncher, JobOutcome, TrainingJob};
pub use time_provider::TimeProvider;
