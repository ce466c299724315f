// Environment Bootstrapper
// Settings file -> process env (no override), then the base env every stage starts from

use std::path::PathBuf;
use tracing::{debug, info, warn};
use trainpush_core::application::constants::{
    DEBUG_TOOLKIT_ENABLED, DEBUG_TOOLKIT_VAR, DISABLE_TELEMETRY_VALUE, DISABLE_TELEMETRY_VAR,
};
use trainpush_core::domain::{Secrets, StageEnv};

/// Overrides the settings file location
pub const ENV_FILE_VAR: &str = "TRAINPUSH_ENV_FILE";

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Result of bootstrapping
#[derive(Debug, Clone)]
pub struct Bootstrap {
    /// Settings file that was actually loaded
    pub settings_file: Option<PathBuf>,
    pub debug_toolkit: bool,
    pub base_env: StageEnv,
}

pub struct EnvironmentBootstrapper {
    settings_path: PathBuf,
}

impl EnvironmentBootstrapper {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// Settings path from `TRAINPUSH_ENV_FILE`, defaulting to `./.env`
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_FILE_VAR).unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
        Self::new(path)
    }

    /// Load settings and build the base stage environment
    ///
    /// Has no error path: a missing or unreadable settings file means nothing is loaded.
    pub fn load(&self) -> Bootstrap {
        let settings_file = self.load_settings();
        let debug_toolkit = debug_enabled(std::env::var(DEBUG_TOOLKIT_VAR).ok().as_deref());

        if debug_toolkit {
            info!("DEBUG_TOOLKIT=1: anomaly detection enabled for the training job");
        }

        Bootstrap {
            settings_file,
            debug_toolkit,
            base_env: base_env(debug_toolkit),
        }
    }

    fn load_settings(&self) -> Option<PathBuf> {
        // dotenvy never overrides variables that are already set
        match dotenvy::from_path(&self.settings_path) {
            Ok(()) => {
                info!(path = %self.settings_path.display(), "Loaded settings file");
                Some(self.settings_path.clone())
            }
            Err(e) if e.not_found() => {
                debug!(path = %self.settings_path.display(), "No settings file, nothing to load");
                None
            }
            Err(e) => {
                warn!(
                    path = %self.settings_path.display(),
                    error = %e,
                    "Ignoring unreadable settings file"
                );
                None
            }
        }
    }
}

/// Only the literal `"1"` enables toolkit debugging
pub fn debug_enabled(value: Option<&str>) -> bool {
    value == Some(DEBUG_TOOLKIT_ENABLED)
}

/// Environment shared by every stage before a credential is installed
pub fn base_env(debug_toolkit: bool) -> StageEnv {
    let mut env = StageEnv::new();
    env.set(DISABLE_TELEMETRY_VAR, DISABLE_TELEMETRY_VALUE);
    if debug_toolkit {
        env.set(DEBUG_TOOLKIT_VAR, DEBUG_TOOLKIT_ENABLED);
    }
    env
}

/// Credentials and repository id from the (bootstrapped) process environment
pub fn read_secrets() -> Secrets {
    Secrets::from_lookup(|key| std::env::var(key).ok())
}
