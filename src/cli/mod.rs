//! CLI commands
//!
//! Command implementations for the `force-rebase` binary.

mod preview;
mod progress;
mod rebase;
mod setting;
mod style;

pub use preview::run_preview;
pub use rebase::run_rebase;
pub use setting::run_setting;

use anstream::eprintln;
use force_rebase::config::Config;
use force_rebase::error::{Error, Result};
use force_rebase::request::{RequestErrors, parse_rebase_request};
use force_rebase::types::RebaseRequest;
use style::{Stream, Stylize};

/// Validate the inputs, printing every field error before failing
fn validate(config: &Config, snippet: &str, branch: &str) -> Result<RebaseRequest> {
    parse_rebase_request(config, snippet, branch).map_err(|errs| {
        print_request_errors(&errs);
        Error::InvalidRequest(errs)
    })
}

fn print_request_errors(errs: &RequestErrors) {
    if let Some(e) = &errs.snippet_error {
        eprintln!("{} {}", "download command:".error(), e);
        eprintln!("  {}", errs.snippet.muted().on(Stream::Stderr));
    }
    if let Some(e) = &errs.branch_error {
        eprintln!("{} {}", "branch:".error(), e);
    }
}

/// Web link to a change
fn change_url(config: &Config, request: &RebaseRequest) -> Option<url::Url> {
    url::Url::parse(&format!(
        "https://{}/r/c/{}/+/{}",
        config.gerrit_host,
        request.repository_name(),
        request.change_number()
    ))
    .ok()
}
