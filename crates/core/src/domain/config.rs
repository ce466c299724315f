// Pipeline Configuration Model
// Plain data: loading/layering happens in the composition root

use super::credential::{HubToken, FIRST_TOKEN_VAR, REPO_ID_VAR, SECOND_TOKEN_VAR};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root of the external training toolkit checkout
pub const DEFAULT_TOOLKIT_DIR: &str = "/workspace/ai-toolkit";

/// Job definition handed to the toolkit
pub const DEFAULT_CONFIG_PATH: &str =
    "/workspace/ai-toolkit/config/examples/train_lora_flux_24gb.yaml";

/// Weights file the toolkit writes for the default job definition
pub const DEFAULT_ARTIFACT_PATH: &str =
    "/workspace/ai-toolkit/output/azizshaw007/azizshaw007.safetensors";

pub const DEFAULT_PATH_IN_REPO: &str = "azizshaw007.safetensors";

pub const DEFAULT_PYTHON: &str = "python";

pub const DEFAULT_ENTRYPOINT: &str = "run.py";

/// How the external toolkit is launched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitSettings {
    /// Working directory for the toolkit process
    pub root: PathBuf,
    /// Interpreter or executable
    pub python: String,
    /// Script passed as first argument
    pub entrypoint: String,
    /// Inherited variables the job may see (None = inherit everything)
    #[serde(default)]
    pub env_allowlist: Option<Vec<String>>,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_TOOLKIT_DIR),
            python: DEFAULT_PYTHON.to_string(),
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
            env_allowlist: None,
        }
    }
}

/// Training job definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub config_path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for JobSpec {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            name: None,
        }
    }
}

/// Artifact handoff from training to publishing
///
/// The destination is always a model repository, so no repository kind is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSpec {
    pub local_path: PathBuf,
    pub path_in_repo: String,
}

impl Default for ArtifactSpec {
    fn default() -> Self {
        Self {
            local_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            path_in_repo: DEFAULT_PATH_IN_REPO.to_string(),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub toolkit: ToolkitSettings,
    #[serde(default)]
    pub job: JobSpec,
    #[serde(default)]
    pub artifact: ArtifactSpec,
}

/// Secrets and per-run identifiers resolved from the environment
///
/// Kept optional: a missing value is a stage failure, not a startup failure.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub first_token: Option<HubToken>,
    pub second_token: Option<HubToken>,
    pub repo_id: Option<String>,
}

impl Secrets {
    /// Resolve secrets through a lookup function (empty values count as unset)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            first_token: non_empty(FIRST_TOKEN_VAR).map(HubToken::new),
            second_token: non_empty(SECOND_TOKEN_VAR).map(HubToken::new),
            repo_id: non_empty(REPO_ID_VAR),
        }
    }
}
