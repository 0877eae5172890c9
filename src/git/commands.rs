//! The git commands of each pipeline step
//!
//! Everything here is pure: building a [`Directive`] never touches the disk or
//! spawns a process.

use crate::config::Config;
use crate::git::invocation::{Invocation, SECRET_PLACEHOLDER};
use crate::repo::RepositoryLocation;
use crate::types::{RebaseRequest, REBASE_BRANCH};

/// Step label: fresh clone
pub const LABEL_CLONE: &str = "Clone repository";
/// Step label: update existing mirror
pub const LABEL_UPDATE: &str = "Update local clone";
/// Step label: committer name
pub const LABEL_CONFIG_NAME: &str = "Configure committer name";
/// Step label: committer email
pub const LABEL_CONFIG_EMAIL: &str = "Configure committer email";
/// Step label: fetch and checkout
pub const LABEL_DOWNLOAD: &str = "Download patch";
/// Step label: stage resolved files
pub const LABEL_STAGE_ALL: &str = "git add .";
/// Step label: continue rebase
pub const LABEL_CONTINUE: &str = "git rebase --continue";
/// Step label: redacted push preview
pub const LABEL_PUSH_PREVIEW: &str = "Push command";
/// Step label: real push
pub const LABEL_PUSH: &str = "Upload rebase";

/// A labelled group of commands run as one step
///
/// Commands run in order; the first failing command that is not best-effort
/// ends the group, like `a && b` in a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Label shown for the step
    pub label: String,
    /// Commands, in order
    pub commands: Vec<Invocation>,
}

impl Directive {
    /// Directive from a label and its commands
    pub fn new(label: impl Into<String>, commands: Vec<Invocation>) -> Self {
        Self {
            label: label.into(),
            commands,
        }
    }
}

/// Builds every command of a pipeline run for one request
#[derive(Debug)]
pub struct CommandBuilder<'a> {
    location: &'a RepositoryLocation,
    request: &'a RebaseRequest,
    committer_name: &'a str,
    committer_email: &'a str,
    account_name: &'a str,
}

impl<'a> CommandBuilder<'a> {
    /// Builder using the committer and account settings from `config`
    pub fn new(
        config: &'a Config,
        location: &'a RepositoryLocation,
        request: &'a RebaseRequest,
    ) -> Self {
        Self {
            location,
            request,
            committer_name: &config.committer_name,
            committer_email: &config.committer_email,
            account_name: &config.gerrit_account_name,
        }
    }

    /// `git -C <mirror> <args>`
    fn git(&self, args: &[&str]) -> Invocation {
        Invocation::git(self.location.git_prefix()).args(args.iter().copied())
    }

    /// Clone the remote into the mirror directory
    pub fn clone_mirror(&self) -> Directive {
        let dest = self.location.mirror_path().display().to_string();
        Directive::new(
            LABEL_CLONE,
            vec![Invocation::git(["clone".to_string(), self.location.remote_url(), dest])],
        )
    }

    /// Bring an existing mirror up to date and drop the last run's branch
    pub fn update(&self) -> Directive {
        let target = self.request.target_branch().as_str();
        Directive::new(
            LABEL_UPDATE,
            vec![
                self.git(&["checkout", target]),
                self.git(&["pull"]),
                self.git(&["branch", "-D", REBASE_BRANCH]).best_effort(),
            ],
        )
    }

    /// Committer name and email; each is its own non-fatal step
    pub fn configure(&self) -> [Directive; 2] {
        [
            Directive::new(
                LABEL_CONFIG_NAME,
                vec![self.git(&["config", "user.name", self.committer_name])],
            ),
            Directive::new(
                LABEL_CONFIG_EMAIL,
                vec![self.git(&["config", "user.email", self.committer_email])],
            ),
        ]
    }

    /// Fetch the change and (re)create the rebase branch on it
    pub fn fetch_and_checkout(&self) -> Directive {
        let remote = self.location.remote_url();
        Directive::new(
            LABEL_DOWNLOAD,
            vec![
                self.git(&["fetch", remote.as_str(), self.request.change_ref()]),
                self.git(&["checkout", "-B", REBASE_BRANCH, "FETCH_HEAD"]),
            ],
        )
    }

    /// Rebase the checked-out change onto the target branch
    pub fn rebase(&self) -> Directive {
        let target = self.request.target_branch().as_str();
        Directive::new(
            format!("Rebase onto {target}"),
            vec![self.git(&["rebase", target])],
        )
    }

    /// Stage everything, conflict markers included
    pub fn stage_all(&self) -> Directive {
        Directive::new(LABEL_STAGE_ALL, vec![self.git(&["add", "."])])
    }

    /// Continue the rebase without ever opening an editor
    pub fn continue_rebase(&self) -> Directive {
        Directive::new(
            LABEL_CONTINUE,
            vec![self.git(&["rebase", "--continue"]).env("GIT_EDITOR", "true")],
        )
    }

    /// Template for the push to `refs/for/<target>`
    pub fn push(&self) -> PushTemplate {
        PushTemplate {
            prefix: self.location.git_prefix(),
            account_name: self.account_name.to_string(),
            gerrit_host: self.location.gerrit_host().to_string(),
            repository_name: self.location.repository_name().to_string(),
            target_branch: self.request.target_branch().as_str().to_string(),
        }
    }
}

/// The push command with its credential left open
///
/// [`PushTemplate::preview`] and [`PushTemplate::executable`] render the same
/// template and differ only in the credential segment of the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTemplate {
    prefix: Vec<String>,
    account_name: String,
    gerrit_host: String,
    repository_name: String,
    target_branch: String,
}

impl PushTemplate {
    fn render(&self, credential: &str) -> Invocation {
        let url = format!(
            "https://{}:{credential}@{}/r/a/{}",
            self.account_name, self.gerrit_host, self.repository_name
        );
        Invocation::git(self.prefix.iter().cloned()).args([
            "push".to_string(),
            url,
            format!("HEAD:refs/for/{}", self.target_branch),
        ])
    }

    /// Rendering with the placeholder, for showing the user
    pub fn preview(&self) -> Invocation {
        self.render(SECRET_PLACEHOLDER)
    }

    /// Rendering with the URL-encoded real password, for execution
    ///
    /// The password is registered as a secret, so formatting the result
    /// yields exactly [`PushTemplate::preview`]'s text.
    pub fn executable(&self, password: &str) -> Invocation {
        let encoded = urlencoding::encode(password).into_owned();
        self.render(&encoded).secret(encoded).secret(password)
    }
}
