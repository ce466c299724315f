// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} not found in environment or .env file")]
    MissingCredential(String),

    #[error("{0} is not set")]
    MissingSetting(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
