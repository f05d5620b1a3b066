// Runtime configuration: API base URL and the two optional signing secrets.
//
// The configuration is read once, after the optional dotenv file has been
// applied, and then passed explicitly into `ApiClient`. Nothing downstream
// reads the process environment.

use crate::error::ClientError;
use std::fmt;
use std::path::Path;

/// Production API gateway.
pub const DEFAULT_API_BASE: &str = "https://api.nftitem.io";

pub const API_BASE_VAR: &str = "NFTITEM_API_BASE";
pub const PRIVATE_KEY_VAR: &str = "X402_PRIVATE_KEY";
pub const MNEMONIC_VAR: &str = "X402_MNEMONIC";

#[derive(Clone)]
pub struct Config {
    pub api_base: String,
    pub private_key: Option<String>,
    pub mnemonic: Option<String>,
}

impl Config {
    /// Build a configuration from the process environment. `NFTITEM_API_BASE`
    /// falls back to the production gateway.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Blank values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let api_base = non_blank(API_BASE_VAR)
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.into());
        Config {
            api_base,
            private_key: non_blank(PRIVATE_KEY_VAR),
            mnemonic: non_blank(MNEMONIC_VAR),
        }
    }

    pub fn has_signer(&self) -> bool {
        self.private_key.is_some() || self.mnemonic.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

// Secrets never reach logs or panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base", &self.api_base)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Load `KEY=value` pairs from `path` into the process environment.
/// Variables already set in the environment are left untouched.
pub fn load_env_file(path: &Path) -> Result<(), ClientError> {
    dotenvy::from_path(path).map_err(|source| ClientError::EnvFile {
        path: path.to_path_buf(),
        source,
    })
}
