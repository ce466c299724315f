// Domain Layer - Pure pipeline entities

pub mod config;
pub mod credential;
pub mod error;
pub mod run;

// Re-exports
pub use config::{ArtifactSpec, JobSpec, PipelineConfig, Secrets, ToolkitSettings};
pub use credential::{HubToken, StageContext, StageEnv};
pub use error::DomainError;
pub use run::{RunCounters, Stage};
