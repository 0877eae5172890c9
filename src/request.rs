//! Validation of the pasted Gerrit download command
//!
//! Gerrit's "Download > Checkout" snippet looks like
//! `git fetch https://<host>/r/<repo> refs/changes/47/770047/1 && git checkout -b change-770047 FETCH_HEAD`.

use crate::config::Config;
use crate::types::{RebaseRequest, TargetBranch};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static DOWNLOAD_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^git fetch https://[^/\s]+/r/(?P<repo>\S+) (?P<ref>refs/changes/\d+/(?P<change>\d+)/\d+) && git checkout -b change-(?P<checkout>\d+) FETCH_HEAD$",
    )
    .expect("hardcoded download command pattern is valid")
});

/// Problem with the pasted download command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnippetError {
    /// Does not match the download command grammar
    #[error("not a Gerrit download command (expected `git fetch https://<host>/r/<repo> refs/changes/.. && git checkout -b change-<n> FETCH_HEAD`)")]
    Malformed,

    /// The fetched change and the checkout branch disagree
    #[error("change number mismatch: fetching change {fetched} but checking out change-{checkout}")]
    ChangeNumberMismatch {
        /// Number from the change ref
        fetched: String,
        /// Number from the `change-<n>` branch
        checkout: String,
    },

    /// Repository is not on the allow-list
    #[error("unknown repository '{0}'")]
    UnknownRepository(String),
}

/// Problem with the target branch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported branch '{0}': must be `master` or `main`")]
pub struct BranchError(pub String);

/// Per-field validation failures, with the submitted values preserved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct RequestErrors {
    /// Submitted download command (trimmed)
    pub snippet: String,
    /// Submitted branch (trimmed)
    pub branch: String,
    /// Download command error, if any
    pub snippet_error: Option<SnippetError>,
    /// Branch error, if any
    pub branch_error: Option<BranchError>,
}

impl fmt::Display for RequestErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .snippet_error
            .iter()
            .map(ToString::to_string)
            .chain(self.branch_error.iter().map(ToString::to_string))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

/// Validate a download command and target branch against `config`
///
/// Both fields are always checked so every error can be reported at once.
pub fn parse_rebase_request(
    config: &Config,
    snippet: &str,
    branch: &str,
) -> Result<RebaseRequest, RequestErrors> {
    let snippet = snippet.trim();
    let branch = branch.trim();

    let parsed_snippet = parse_snippet(config, snippet);
    let parsed_branch = TargetBranch::parse(branch).ok_or_else(|| BranchError(branch.to_string()));

    match (parsed_snippet, parsed_branch) {
        (Ok(snippet), Ok(target_branch)) => Ok(RebaseRequest::new(
            snippet.original,
            snippet.repo,
            snippet.change_ref,
            snippet.change_number,
            target_branch,
        )),
        (snippet_result, branch_result) => Err(RequestErrors {
            snippet: snippet.to_string(),
            branch: branch.to_string(),
            snippet_error: snippet_result.err(),
            branch_error: branch_result.err(),
        }),
    }
}

struct ParsedSnippet {
    original: String,
    repo: String,
    change_ref: String,
    change_number: u64,
}

fn parse_snippet(config: &Config, snippet: &str) -> Result<ParsedSnippet, SnippetError> {
    let caps = DOWNLOAD_COMMAND
        .captures(snippet)
        .ok_or(SnippetError::Malformed)?;

    let fetched = &caps["change"];
    let checkout = &caps["checkout"];
    if fetched != checkout {
        return Err(SnippetError::ChangeNumberMismatch {
            fetched: fetched.to_string(),
            checkout: checkout.to_string(),
        });
    }
    let change_number = fetched.parse().map_err(|_| SnippetError::Malformed)?;

    let repo = &caps["repo"];
    if !config.is_allowed_repository(repo) {
        return Err(SnippetError::UnknownRepository(repo.to_string()));
    }

    Ok(ParsedSnippet {
        original: snippet.to_string(),
        repo: repo.to_string(),
        change_ref: caps["ref"].to_string(),
        change_number,
    })
}
