// File Credential Store
// Same token file the Hugging Face client libraries authenticate from

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use trainpush_core::domain::HubToken;
use trainpush_core::port::{CredentialError, CredentialStore};

/// Explicit token file location
pub const HF_TOKEN_PATH_VAR: &str = "HF_TOKEN_PATH";

/// Hub cache root (token lives at `$HF_HOME/token`)
pub const HF_HOME_VAR: &str = "HF_HOME";

pub const XDG_CACHE_HOME_VAR: &str = "XDG_CACHE_HOME";

const TOKEN_FILE_NAME: &str = "token";

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the token path the way the hub client does
    pub fn from_env() -> Result<Self, CredentialError> {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let path = resolve_token_path(|key| std::env::var(key).ok(), home)?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `$HF_TOKEN_PATH`, else `$HF_HOME/token`, else `$XDG_CACHE_HOME/huggingface/token`,
/// else `~/.cache/huggingface/token`
pub fn resolve_token_path<F>(lookup: F, home: Option<PathBuf>) -> Result<PathBuf, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(path) = non_empty(HF_TOKEN_PATH_VAR) {
        return Ok(PathBuf::from(path));
    }
    if let Some(hf_home) = non_empty(HF_HOME_VAR) {
        return Ok(PathBuf::from(hf_home).join(TOKEN_FILE_NAME));
    }
    if let Some(cache) = non_empty(XDG_CACHE_HOME_VAR) {
        return Ok(PathBuf::from(cache)
            .join("huggingface")
            .join(TOKEN_FILE_NAME));
    }

    home.map(|h| h.join(".cache").join("huggingface").join(TOKEN_FILE_NAME))
        .ok_or_else(|| CredentialError::Unavailable("cannot resolve home directory".to_string()))
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, token: &HubToken) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token.expose())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), "Token persisted");
        Ok(())
    }

    fn load(&self) -> Result<Option<HubToken>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(HubToken::new(trimmed)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
