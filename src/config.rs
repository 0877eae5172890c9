//! Configuration
//!
//! Settings are read from a JSON file (default `<config dir>/force-rebase/config.json`).
//! Every field has a default, so a missing default file is not an error.
//! `FORCE_REBASE_GERRIT_HOST` and `FORCE_REBASE_MIRRORS_ROOT` override the file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "force-rebase";

/// What to do when a second rebase targets a mirror that is already locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockPolicy {
    /// Fail immediately with `Busy`
    #[default]
    FailFast,
    /// Wait up to `lock_wait_secs`, then fail with `Busy`
    Wait,
}

/// What to do after a step's required command exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Report the failure and keep going, up to and including the push
    #[default]
    Continue,
    /// Report the failure and stop
    Abort,
}

/// Operator login settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Where `begin_login` sends the user
    pub login_url: String,
    /// Verifier token -> operator name
    pub tokens: HashMap<String, String>,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gerrit host used for clone, fetch and push
    pub gerrit_host: String,
    /// Directory holding one mirror per repository
    pub mirrors_root: PathBuf,
    /// Committer name configured in each mirror
    pub committer_name: String,
    /// Committer email configured in each mirror
    pub committer_email: String,
    /// Gerrit HTTP account used for pushing
    pub gerrit_account_name: String,
    /// Secret holding the Gerrit HTTP password
    pub push_secret_name: String,
    /// Repositories that may be rebased
    pub allowed_repositories: Vec<String>,
    /// Upper bound on any single git invocation
    pub step_timeout_secs: u64,
    /// Behaviour when the mirror is locked
    pub lock_policy: LockPolicy,
    /// Max wait under [`LockPolicy::Wait`]
    pub lock_wait_secs: u64,
    /// Behaviour after a failed step
    pub on_step_failure: FailurePolicy,
    /// JSON secrets file; falls back to environment secrets when absent
    pub secrets_file: Option<PathBuf>,
    /// Operator login
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gerrit_host: "gerrit.wikimedia.org".to_string(),
            mirrors_root: default_mirrors_root(),
            committer_name: "ForceRebase".to_string(),
            committer_email: "force-rebase@localhost".to_string(),
            gerrit_account_name: "force-rebase-bot".to_string(),
            push_secret_name: "gerritAccountPassword".to_string(),
            allowed_repositories: vec![
                "mediawiki/core".to_string(),
                "mediawiki/extensions/examples".to_string(),
            ],
            step_timeout_secs: 600,
            lock_policy: LockPolicy::default(),
            lock_wait_secs: 300,
            on_step_failure: FailurePolicy::default(),
            secrets_file: dirs::config_dir().map(|d| d.join(APP_DIR).join("secrets.json")),
            auth: AuthConfig::default(),
        }
    }
}

fn default_mirrors_root() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("repositories"),
        |d| d.join(APP_DIR).join("repositories"),
    )
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.json"))
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file '{}': {e}", path.display()))
        })?;
        let config = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("FORCE_REBASE_GERRIT_HOST") {
            self.gerrit_host = host;
        }
        if let Ok(root) = env::var("FORCE_REBASE_MIRRORS_ROOT") {
            self.mirrors_root = PathBuf::from(root);
        }
    }

    /// Step timeout as a [`Duration`]
    pub const fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Lock wait as a [`Duration`]
    pub const fn lock_wait(&self) -> Duration {
        Duration::from_secs(self.lock_wait_secs)
    }

    /// Whether `repository_name` may be rebased
    pub fn is_allowed_repository(&self, repository_name: &str) -> bool {
        self.allowed_repositories
            .iter()
            .any(|r| r == repository_name)
    }

    /// Look up a setting by its external name
    pub fn setting(&self, name: &str) -> Result<String> {
        let value = match name {
            "git-config-name" => self.committer_name.clone(),
            "git-config-email" => self.committer_email.clone(),
            "gerrit-account-name" => self.gerrit_account_name.clone(),
            "gerrit-host" => self.gerrit_host.clone(),
            "mirrors-root" => self.mirrors_root.display().to_string(),
            "push-secret-name" => self.push_secret_name.clone(),
            "step-timeout-secs" => self.step_timeout_secs.to_string(),
            "allowed-repositories" => self.allowed_repositories.join("\n"),
            _ => return Err(Error::UnknownSetting(name.to_string())),
        };
        Ok(value)
    }
}
