//! Running external commands

use crate::error::{Error, Result};
use crate::git::invocation::Invocation;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// What a finished command produced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// stdout followed by stderr, lossily decoded and redacted
    pub text: String,
    /// Exit status was zero
    pub success: bool,
}

impl CommandOutput {
    /// Successful output
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    /// Failed output
    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: false,
        }
    }
}

/// Executes one invocation to completion
///
/// A non-zero exit is not an error here; only failing to run the command at
/// all (or running out of time) is.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` and capture its combined output
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs invocations as child processes with a per-command time limit
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    /// Runner that kills any command still running after `timeout`
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    #[instrument(skip_all, fields(command = %invocation))]
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.raw_args())
            .env("GIT_TERMINAL_PROMPT", "0")
            .envs(invocation.envs().iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("spawning");
        let child = cmd.spawn().map_err(|source| Error::Spawn {
            command: invocation.to_string(),
            source,
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout {
                command: invocation.to_string(),
                seconds: self.timeout.as_secs(),
            })??;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(status = %output.status, bytes = text.len(), "finished");
        Ok(CommandOutput {
            text: invocation.redact(&text),
            success: output.status.success(),
        })
    }
}
