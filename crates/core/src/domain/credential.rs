// Credential Domain Model
// Tokens travel with the stage that uses them instead of through the process env

use super::run::Stage;
use std::collections::BTreeMap;
use std::fmt;

/// Environment variable the registry client and the toolkit read the active token from
pub const HF_TOKEN_VAR: &str = "HF_TOKEN";

/// Training-stage credential source
pub const FIRST_TOKEN_VAR: &str = "HF_TOKEN_FIRST";

/// Upload-stage credential source
pub const SECOND_TOKEN_VAR: &str = "HF_TOKEN_SECOND";

/// Destination repository source
pub const REPO_ID_VAR: &str = "REPO_ID";

/// Number of leading characters shown when a token is logged
pub const TOKEN_PREVIEW_CHARS: usize = 6;

/// Opaque registry access token
///
/// No format validation happens here; the registry is the only judge of a token.
#[derive(Clone, PartialEq, Eq)]
pub struct HubToken(String);

impl HubToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret (only for adapters that must transmit or persist it)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Log-safe preview: first six characters followed by `...`
    pub fn redacted(&self) -> String {
        let preview: String = self.0.chars().take(TOKEN_PREVIEW_CHARS).collect();
        format!("{}...", preview)
    }
}

impl fmt::Debug for HubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HubToken").field(&self.redacted()).finish()
    }
}

/// Environment handed to a single stage
///
/// Ordered map so that launches and logs are deterministic.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StageEnv(BTreeMap<String, String>);

impl StageEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this environment with `HF_TOKEN` set to `token`
    pub fn with_token(&self, token: &HubToken) -> Self {
        let mut env = self.clone();
        env.set(HF_TOKEN_VAR, token.expose());
        env
    }
}

impl fmt::Debug for StageEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.0 {
            if key == HF_TOKEN_VAR {
                map.entry(key, &HubToken::new(value.clone()).redacted());
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

/// Credential installed for one stage, plus the environment built around it
#[derive(Debug, Clone)]
pub struct StageContext {
    pub stage: Stage,
    pub token: HubToken,
    pub env: StageEnv,
}
