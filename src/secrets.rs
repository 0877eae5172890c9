//! Named secret lookup
//!
//! Secrets come from a JSON file (an object of string values) or from
//! `FORCE_REBASE_*` environment variables.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Resolves credentials by name
pub trait SecretStore: Send + Sync {
    /// Get a secret, failing with [`Error::SecretNotFound`] for unknown names
    fn get_secret(&self, name: &str) -> Result<String>;
}

impl SecretStore for HashMap<String, String> {
    fn get_secret(&self, name: &str) -> Result<String> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::SecretNotFound(name.to_string()))
    }
}

/// Secrets loaded once from a JSON file
pub struct FileSecretStore {
    values: HashMap<String, String>,
}

impl FileSecretStore {
    /// Load and validate the secrets file
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "missing secrets file '{}'",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let serde_json::Value::Object(map) = value else {
            return Err(Error::Config(format!(
                "secrets file '{}' is not a JSON object",
                path.display()
            )));
        };

        let mut values = HashMap::with_capacity(map.len());
        for (name, value) in map {
            let serde_json::Value::String(secret) = value else {
                return Err(Error::Config(format!("secret '{name}' is not a string")));
            };
            values.insert(name, secret);
        }
        tracing::debug!(path = %path.display(), count = values.len(), "loaded secrets file");
        Ok(Self { values })
    }
}

impl SecretStore for FileSecretStore {
    fn get_secret(&self, name: &str) -> Result<String> {
        self.values.get_secret(name)
    }
}

/// Secrets read from the environment
///
/// `gerritAccountPassword` is read from `FORCE_REBASE_GERRIT_ACCOUNT_PASSWORD`.
#[derive(Debug, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    /// Environment variable holding the secret `name`
    pub fn var_name(name: &str) -> String {
        let mut var = String::from("FORCE_REBASE_");
        let mut prev_lower = false;
        for c in name.chars() {
            if c.is_ascii_uppercase() && prev_lower {
                var.push('_');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            if c == '-' || c == '.' {
                var.push('_');
            } else {
                var.push(c.to_ascii_uppercase());
            }
        }
        var
    }
}

impl SecretStore for EnvSecretStore {
    fn get_secret(&self, name: &str) -> Result<String> {
        env::var(Self::var_name(name)).map_err(|_| Error::SecretNotFound(name.to_string()))
    }
}
