//! Error types for force-rebase

use crate::request::RequestErrors;
use thiserror::Error;

/// Errors raised while validating or running a rebase
#[derive(Error, Debug)]
pub enum Error {
    /// No authenticated identity in the session
    #[error("not logged in")]
    NotAuthenticated,

    /// Login flow failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// The pasted command or branch did not validate
    #[error("invalid rebase request: {0}")]
    InvalidRequest(#[from] RequestErrors),

    /// The external tool could not be started at all
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Redacted rendering of the command
        command: String,
        /// Underlying spawn failure
        #[source]
        source: std::io::Error,
    },

    /// The external tool did not exit within the step timeout
    #[error("`{command}` timed out after {seconds}s")]
    Timeout {
        /// Redacted rendering of the command
        command: String,
        /// Configured limit
        seconds: u64,
    },

    /// Another rebase holds the mirror lock
    #[error("repository mirror '{0}' is busy with another rebase")]
    Busy(String),

    /// Secret name not known to the secret store
    #[error("unknown secret '{0}'")]
    SecretNotFound(String),

    /// Setting name not known to the configuration
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    /// Configuration or secrets file problem
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The pipeline ran but at least one step failed
    #[error("rebase did not complete: {0}")]
    Incomplete(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
