// Credential Switcher
// Installs one identity per stage: persisted store + that stage's environment

use crate::domain::{HubToken, Stage, StageContext, StageEnv};
use crate::port::{CredentialError, CredentialStore};
use std::sync::Arc;
use tracing::info;

pub struct CredentialSwitcher {
    store: Arc<dyn CredentialStore>,
    base_env: StageEnv,
}

impl CredentialSwitcher {
    /// `base_env` is the bootstrap environment every stage starts from
    pub fn new(store: Arc<dyn CredentialStore>, base_env: StageEnv) -> Self {
        Self { store, base_env }
    }

    /// Install `token` for `stage`
    ///
    /// The store is overwritten unconditionally; the returned environment holds
    /// the token under `HF_TOKEN`. Nothing is validated here.
    pub fn install(&self, stage: Stage, token: HubToken) -> Result<StageContext, CredentialError> {
        self.store.save(&token)?;
        let env = self.base_env.with_token(&token);

        info!(
            stage = %stage,
            token = %token.redacted(),
            "Set new Hugging Face token"
        );

        Ok(StageContext { stage, token, env })
    }
}
