//! Preview command - show what a rebase would run

use crate::cli::style::{arrow, hyperlink_url, Stream, Stylize};
use crate::cli::{change_url, validate};
use anstream::println;
use force_rebase::config::Config;
use force_rebase::error::Result;
use force_rebase::git::{CommandBuilder, Directive};
use force_rebase::repo::RepositoryLocation;

fn print_directive(directive: &Directive) {
    println!("{}", directive.label.emphasis());
    for command in &directive.commands {
        let note = if command.is_best_effort() {
            " (failure ignored)"
        } else {
            ""
        };
        println!("  {} {}{}", arrow(), command, note.muted());
    }
}

/// Run the preview command
///
/// Validates the inputs and prints every command in pipeline order. The push
/// is shown with the password placeholder. Nothing is executed.
pub fn run_preview(config: &Config, snippet: &str, branch: &str) -> Result<()> {
    let request = validate(config, snippet, branch)?;
    let location = RepositoryLocation::for_request(config, &request);
    let builder = CommandBuilder::new(config, &location, &request);

    println!(
        "Change {} of {} onto {}",
        request.change_number().accent(),
        request.repository_name().accent(),
        request.target_branch().accent()
    );
    if let Some(url) = change_url(config, &request) {
        println!("  {}", hyperlink_url(Stream::Stdout, url.as_str()));
    }
    let mirror_state = if location.exists() {
        "exists"
    } else {
        "will be cloned"
    };
    println!(
        "Mirror: {} ({})",
        location.mirror_path().display(),
        mirror_state.muted()
    );
    println!();

    if location.exists() {
        print_directive(&builder.update());
    } else {
        print_directive(&builder.clone_mirror());
    }
    for directive in builder.configure() {
        print_directive(&directive);
    }
    print_directive(&builder.fetch_and_checkout());
    print_directive(&builder.rebase());

    println!("{}", "If the rebase stops on conflicts:".muted());
    print_directive(&builder.stage_all());
    print_directive(&builder.continue_rebase());

    print_directive(&Directive::new(
        "Push for review",
        vec![builder.push().preview()],
    ));

    Ok(())
}
