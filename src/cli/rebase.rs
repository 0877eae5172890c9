//! Rebase command - run the full pipeline for one change

use crate::cli::progress::TerminalPresenter;
use crate::cli::style::{hyperlink_url, Stream, Stylize};
use crate::cli::{change_url, validate};
use anstream::{eprintln, println};
use force_rebase::auth::{Authenticator, Session, TokenAuthenticator};
use force_rebase::config::Config;
use force_rebase::error::{Error, Result};
use force_rebase::git::SystemRunner;
use force_rebase::rebase::RebaseOrchestrator;
use force_rebase::secrets::{EnvSecretStore, FileSecretStore, SecretStore};

/// Secrets file if one exists, environment otherwise
fn open_secrets(config: &Config) -> Result<Box<dyn SecretStore>> {
    match &config.secrets_file {
        Some(path) if path.exists() => Ok(Box::new(FileSecretStore::open(path)?)),
        _ => Ok(Box::new(EnvSecretStore)),
    }
}

/// Run the rebase command
pub async fn run_rebase(
    config: &Config,
    snippet: &str,
    branch: &str,
    token: Option<&str>,
) -> Result<()> {
    let authenticator = TokenAuthenticator::from_config(&config.auth);
    let mut session = Session::new();

    let Some(token) = token else {
        match authenticator.begin_login(&mut session).await {
            Ok(url) => eprintln!(
                "Log in at {} and pass the token with --token",
                hyperlink_url(Stream::Stderr, &url)
            ),
            Err(_) => eprintln!("Pass an operator token with --token or FORCE_REBASE_TOKEN"),
        }
        return Err(Error::NotAuthenticated);
    };
    authenticator.complete_login(&mut session, token).await?;

    let request = validate(config, snippet, branch)?;

    println!(
        "Rebasing change {} of {} onto {}",
        request.change_number().accent(),
        request.repository_name().accent(),
        request.target_branch().accent()
    );
    println!("  {}", request.original_command().muted());
    println!();

    let runner = SystemRunner::new(config.step_timeout());
    let secrets = open_secrets(config)?;
    let presenter = TerminalPresenter::new();
    let orchestrator = RebaseOrchestrator::new(config, &runner, secrets.as_ref(), &presenter);

    let result = orchestrator.run(&session, &authenticator, &request).await;
    authenticator.log_out(&mut session).await;
    let report = result?;

    println!();
    if let Some(url) = change_url(config, &request) {
        println!("{}", hyperlink_url(Stream::Stdout, url.as_str()));
    }

    if let Some(step) = &report.aborted_at {
        eprintln!("{} after '{}' failed", "Stopped".warn(), step);
        return Err(Error::Incomplete(format!("stopped after '{step}'")));
    }
    let failed = report.failed_steps();
    if !failed.is_empty() {
        eprintln!(
            "{}",
            "Finished, but some steps failed - check the output above".warn()
        );
        return Err(Error::Incomplete(format!(
            "failed steps: {}",
            failed.join(", ")
        )));
    }

    println!("Rebased and pushed for review by {}", report.requested_by.accent());
    Ok(())
}
