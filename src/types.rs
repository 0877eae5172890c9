//! Core types for force-rebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the local branch the fetched patch is checked out on.
///
/// Fixed, so only one rebase can be in flight per mirror.
pub const REBASE_BRANCH: &str = "to-rebase";

/// Branch a change can be rebased onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetBranch {
    /// `master`
    Master,
    /// `main`
    Main,
}

impl TargetBranch {
    /// Parse an exact branch name; anything but `master`/`main` is rejected
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "master" => Some(Self::Master),
            "main" => Some(Self::Main),
            _ => None,
        }
    }

    /// Branch name as git sees it
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Main => "main",
        }
    }
}

impl fmt::Display for TargetBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace path separators so a repository name can be used as a directory key.
///
/// `mediawiki/extensions/Foo` becomes `mediawiki_extensions_Foo`. Distinct
/// names that squash to the same key share a mirror.
pub fn squash_repository_name(repository_name: &str) -> String {
    repository_name.replace('/', "_")
}

/// A validated request to rebase one Gerrit change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseRequest {
    original_command: String,
    repository_name: String,
    local_name: String,
    change_ref: String,
    change_number: u64,
    target_branch: TargetBranch,
}

impl RebaseRequest {
    /// Build a request; `local_name` is derived here and never recomputed
    pub fn new(
        original_command: impl Into<String>,
        repository_name: impl Into<String>,
        change_ref: impl Into<String>,
        change_number: u64,
        target_branch: TargetBranch,
    ) -> Self {
        let repository_name = repository_name.into();
        let local_name = squash_repository_name(&repository_name);
        Self {
            original_command: original_command.into(),
            repository_name,
            local_name,
            change_ref: change_ref.into(),
            change_number,
            target_branch,
        }
    }

    /// The pasted download command, for display
    pub fn original_command(&self) -> &str {
        &self.original_command
    }

    /// Canonical repository name, e.g. `mediawiki/core`
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Squashed repository name used as the mirror directory
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// e.g. `refs/changes/47/770047/1`
    pub fn change_ref(&self) -> &str {
        &self.change_ref
    }

    /// Gerrit change number
    pub const fn change_number(&self) -> u64 {
        self.change_number
    }

    /// Branch to rebase onto
    pub const fn target_branch(&self) -> TargetBranch {
        self.target_branch
    }
}

/// Output of one pipeline step, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// Step label
    pub label: String,
    /// Captured output; empty output is stored as `None`
    pub output: Option<String>,
    /// Whether every required command in the step exited successfully
    pub succeeded: bool,
}

impl StepResult {
    /// Create a step result, folding empty output into "nothing"
    pub fn new(label: impl Into<String>, output: impl Into<String>, succeeded: bool) -> Self {
        let output = output.into();
        Self {
            label: label.into(),
            output: if output.is_empty() { None } else { Some(output) },
            succeeded,
        }
    }

    /// Output text, or `""` for nothing
    pub fn output_text(&self) -> &str {
        self.output.as_deref().unwrap_or("")
    }
}

/// Pipeline state machine positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    /// Nothing has run yet
    Start,
    /// Mirror cloned or updated
    MirrorReady,
    /// Committer identity configured
    Configured,
    /// Patch fetched and checked out on the rebase branch
    PatchFetched,
    /// Rebase attempted
    Rebasing,
    /// Rebase stopped on conflicts
    Conflicted,
    /// Staged everything and continued the rebase
    Continued,
    /// Push attempted
    Pushed,
    /// Pipeline finished
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "Starting",
            Self::MirrorReady => "Mirror ready",
            Self::Configured => "Configured",
            Self::PatchFetched => "Patch fetched",
            Self::Rebasing => "Rebasing",
            Self::Conflicted => "Conflicts found",
            Self::Continued => "Continued rebase",
            Self::Pushed => "Pushed",
            Self::Done => "Done",
        };
        f.write_str(s)
    }
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct RebaseReport {
    /// Identity that requested the rebase
    pub requested_by: String,
    /// Change number that was rebased
    pub change_number: u64,
    /// Steps in execution order
    pub steps: Vec<StepResult>,
    /// Where the state machine stopped
    pub final_state: PipelineState,
    /// Whether conflict continuation was attempted
    pub continued: bool,
    /// Label of the step that stopped the run under the abort policy
    pub aborted_at: Option<String>,
    /// Label of the failed rebase that conflict continuation carried on from
    pub recovered: Option<String>,
}

impl RebaseReport {
    /// Labels of failed steps, not counting a rebase recovered by continuation
    pub fn failed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| !s.succeeded && self.recovered.as_deref() != Some(s.label.as_str()))
            .map(|s| s.label.as_str())
            .collect()
    }

    /// True if nothing aborted and every unrecovered step exited successfully
    pub fn all_succeeded(&self) -> bool {
        self.aborted_at.is_none() && self.failed_steps().is_empty()
    }
}
