//! Terminal presenter with a spinner per running step

use crate::cli::style::{check, cross, spinner_style, Stream, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use force_rebase::error::Error;
use force_rebase::rebase::Presenter;
use force_rebase::types::{PipelineState, StepResult};
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// Prints each step's label and output as the pipeline runs
///
/// Output is printed verbatim and indented; empty output shows as
/// `-nothing-` so every step stays visible.
pub struct TerminalPresenter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalPresenter {
    /// Presenter with no step running
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn clear_spinner(&self) {
        if let Some(bar) = self.spinner.lock().ok().and_then(|mut s| s.take()) {
            bar.finish_and_clear();
        }
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn on_state(&self, state: PipelineState) {
        match state {
            PipelineState::Conflicted => {
                println!(
                    "{}",
                    "Rebase stopped on conflicts, staging everything and continuing".warn()
                );
            }
            PipelineState::Done => println!("{}", "Done".emphasis()),
            _ => {}
        }
    }

    async fn on_step_started(&self, label: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(old) = slot.replace(bar) {
                old.finish_and_clear();
            }
        }
    }

    async fn on_step(&self, step: &StepResult) {
        self.clear_spinner();
        let marker = if step.succeeded {
            check().to_string()
        } else {
            cross().on(Stream::Stdout).to_string()
        };

        match &step.output {
            None => println!("{marker} {}: {}", step.label.emphasis(), "-nothing-".muted()),
            Some(output) => {
                println!("{marker} {}:", step.label.emphasis());
                for line in output.lines() {
                    println!("    {}", line.muted());
                }
            }
        }
    }

    async fn on_error(&self, err: &Error) {
        self.clear_spinner();
        eprintln!("{}: {}", "error".error(), err);
    }
}
