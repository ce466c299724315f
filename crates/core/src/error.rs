// Central Error Types for the Pipeline

use crate::domain::Stage;
use thiserror::Error;

/// Application-level error type (what went wrong)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Publish error: {0}")]
    Publish(#[from] crate::port::PublishError),

    #[error("Credential error: {0}")]
    Credential(#[from] crate::port::CredentialError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Stage-tagged failure (where it went wrong)
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<AppError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
