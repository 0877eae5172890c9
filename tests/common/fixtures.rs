//! Test data factories for force-rebase types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use force_rebase::auth::{Authenticator, Session, TokenAuthenticator};
use force_rebase::config::{Config, FailurePolicy, LockPolicy};
use force_rebase::request::parse_rebase_request;
use force_rebase::types::RebaseRequest;
use std::collections::HashMap;
use std::path::Path;

/// Download command for change 770047 of `org/project`
pub const SNIPPET: &str = "git fetch https://example.org/r/org/project refs/changes/47/770047/1 && git checkout -b change-770047 FETCH_HEAD";

/// Push password used by [`secrets`]
pub const PASSWORD: &str = "hunter2 & co";

/// Operator token accepted by [`authenticator`]
pub const TOKEN: &str = "op-token";

/// Operator name behind [`TOKEN`]
pub const OPERATOR: &str = "Alice";

/// Config with mirrors under `root` and `org/project` allowed
pub fn make_config(root: &Path) -> Config {
    Config {
        gerrit_host: "example.org".to_string(),
        mirrors_root: root.to_path_buf(),
        committer_name: "Rebase Bot".to_string(),
        committer_email: "bot@example.org".to_string(),
        gerrit_account_name: "rebase-bot".to_string(),
        allowed_repositories: vec!["org/project".to_string()],
        secrets_file: None,
        ..Config::default()
    }
}

/// Config that stops on the first failed step
pub fn make_abort_config(root: &Path) -> Config {
    Config {
        on_step_failure: FailurePolicy::Abort,
        ..make_config(root)
    }
}

/// Config that waits up to `secs` for a busy mirror
pub fn make_waiting_config(root: &Path, secs: u64) -> Config {
    Config {
        lock_policy: LockPolicy::Wait,
        lock_wait_secs: secs,
        ..make_config(root)
    }
}

/// Validated request for [`SNIPPET`] onto `master`
pub fn make_request(config: &Config) -> RebaseRequest {
    parse_rebase_request(config, SNIPPET, "master").expect("fixture snippet is valid")
}

/// Authenticator knowing only [`TOKEN`]
pub fn authenticator() -> TokenAuthenticator {
    let mut tokens = HashMap::new();
    tokens.insert(TOKEN.to_string(), OPERATOR.to_string());
    TokenAuthenticator::new("https://login.example.org".to_string(), tokens)
}

/// Session logged in as [`OPERATOR`]
pub async fn logged_in(auth: &TokenAuthenticator) -> Session {
    let mut session = Session::new();
    auth.complete_login(&mut session, TOKEN)
        .await
        .expect("fixture token is valid");
    session
}

/// Secret store holding the push password
pub fn secrets() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("gerritAccountPassword".to_string(), PASSWORD.to_string());
    map
}

/// Pretend a mirror already exists under `root`
pub fn make_existing_mirror(root: &Path, local_name: &str) {
    std::fs::create_dir_all(root.join(local_name).join(".git")).expect("create fake mirror");
}
