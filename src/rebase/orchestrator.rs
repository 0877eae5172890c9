//! The rebase pipeline
//!
//! Runs the fixed step sequence for one request:
//! 1. Clone or update the mirror
//! 2. Configure the committer identity
//! 3. Fetch the change onto the rebase branch
//! 4. Rebase onto the target branch, continuing once through conflicts
//! 5. Push for review

use crate::auth::{Authenticator, Session};
use crate::config::{Config, FailurePolicy};
use crate::error::Result;
use crate::git::commands::{LABEL_PUSH, LABEL_PUSH_PREVIEW};
use crate::git::{CommandBuilder, Directive, ProcessRunner};
use crate::rebase::{ConflictDetector, Presenter, SubstringConflictDetector};
use crate::repo::{MirrorLock, RepositoryLocation};
use crate::secrets::SecretStore;
use crate::types::{PipelineState, RebaseReport, RebaseRequest, StepResult};
use tracing::{debug, info, instrument, warn};

/// Whether a failed step stops the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Report and move on to the next step
    ContinueOnError,
    /// Report and stop the run
    AbortOnError,
}

impl From<FailurePolicy> for StepPolicy {
    fn from(policy: FailurePolicy) -> Self {
        match policy {
            FailurePolicy::Continue => Self::ContinueOnError,
            FailurePolicy::Abort => Self::AbortOnError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Proceed,
    Stop,
}

/// Drives one rebase request through the pipeline
pub struct RebaseOrchestrator<'a> {
    config: &'a Config,
    runner: &'a dyn ProcessRunner,
    secrets: &'a dyn SecretStore,
    presenter: &'a dyn Presenter,
    detector: Box<dyn ConflictDetector + 'a>,
}

impl<'a> RebaseOrchestrator<'a> {
    /// Orchestrator using git's conflict message as the continuation signal
    pub fn new(
        config: &'a Config,
        runner: &'a dyn ProcessRunner,
        secrets: &'a dyn SecretStore,
        presenter: &'a dyn Presenter,
    ) -> Self {
        Self {
            config,
            runner,
            secrets,
            presenter,
            detector: Box::new(SubstringConflictDetector::default()),
        }
    }

    /// Replace the conflict rule
    #[must_use]
    pub fn with_conflict_detector(mut self, detector: impl ConflictDetector + 'a) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Policy for steps whose failure the configuration governs
    pub fn step_policy(&self) -> StepPolicy {
        self.config.on_step_failure.into()
    }

    /// Run the pipeline for an authenticated operator
    ///
    /// Nothing runs unless `session` is logged in. The mirror lock is held
    /// for the whole run. Fatal errors are passed to the presenter and
    /// returned; step failures are recorded in the report.
    #[instrument(skip_all, fields(repo = request.repository_name(), change = request.change_number()))]
    pub async fn run(
        &self,
        session: &Session,
        authenticator: &dyn Authenticator,
        request: &RebaseRequest,
    ) -> Result<RebaseReport> {
        let identity = authenticator.current_identity(session).await?;
        info!(%identity, branch = %request.target_branch(), "starting rebase");

        let result = self.run_locked(identity, request).await;
        if let Err(e) = &result {
            warn!("rebase stopped: {e}");
            self.presenter.on_error(e).await;
        }
        result
    }

    async fn run_locked(&self, identity: String, request: &RebaseRequest) -> Result<RebaseReport> {
        let location = RepositoryLocation::for_request(self.config, request);
        tokio::fs::create_dir_all(location.mirrors_root()).await?;
        let _lock = MirrorLock::acquire(
            &location,
            self.config.lock_policy,
            self.config.lock_wait(),
        )
        .await?;

        let mut report = RebaseReport {
            requested_by: identity,
            change_number: request.change_number(),
            steps: Vec::new(),
            final_state: PipelineState::Start,
            continued: false,
            aborted_at: None,
            recovered: None,
        };
        self.execute(&mut report, &location, request).await?;
        Ok(report)
    }

    async fn execute(
        &self,
        report: &mut RebaseReport,
        location: &RepositoryLocation,
        request: &RebaseRequest,
    ) -> Result<()> {
        let builder = CommandBuilder::new(self.config, location, request);
        let policy = self.step_policy();
        self.enter(report, PipelineState::Start).await;

        let mirror = if location.exists() {
            builder.update()
        } else {
            builder.clone_mirror()
        };
        if self.step(report, &mirror, policy).await? == Flow::Stop {
            return Ok(());
        }
        self.enter(report, PipelineState::MirrorReady).await;

        for directive in builder.configure() {
            self.step(report, &directive, StepPolicy::ContinueOnError)
                .await?;
        }
        self.enter(report, PipelineState::Configured).await;

        if self.step(report, &builder.fetch_and_checkout(), policy).await? == Flow::Stop {
            return Ok(());
        }
        self.enter(report, PipelineState::PatchFetched).await;

        self.enter(report, PipelineState::Rebasing).await;
        let rebase = builder.rebase();
        let result = self.run_directive(&rebase).await?;
        let conflicted = self.detector.is_conflict_signal(result.output_text());
        let rebase_failed = !result.succeeded;
        self.record(report, result).await;

        if conflicted {
            self.enter(report, PipelineState::Conflicted).await;
            report.continued = true;
            if rebase_failed {
                report.recovered = Some(rebase.label.clone());
            }
            if self.step(report, &builder.stage_all(), policy).await? == Flow::Stop {
                return Ok(());
            }
            if self.step(report, &builder.continue_rebase(), policy).await? == Flow::Stop {
                return Ok(());
            }
            self.enter(report, PipelineState::Continued).await;
        } else if rebase_failed && apply_policy(report, &rebase.label, policy) == Flow::Stop {
            return Ok(());
        }

        let push = builder.push();
        self.record(
            report,
            StepResult::new(LABEL_PUSH_PREVIEW, push.preview().to_string(), true),
        )
        .await;
        let password = self.secrets.get_secret(&self.config.push_secret_name)?;
        let upload = Directive::new(LABEL_PUSH, vec![push.executable(&password)]);
        if self.step(report, &upload, policy).await? == Flow::Stop {
            return Ok(());
        }
        self.enter(report, PipelineState::Pushed).await;

        self.enter(report, PipelineState::Done).await;
        Ok(())
    }

    /// Run a directive, record it, and apply `policy` to a failure
    async fn step(
        &self,
        report: &mut RebaseReport,
        directive: &Directive,
        policy: StepPolicy,
    ) -> Result<Flow> {
        let result = self.run_directive(directive).await?;
        let succeeded = result.succeeded;
        self.record(report, result).await;
        if succeeded {
            Ok(Flow::Proceed)
        } else {
            Ok(apply_policy(report, &directive.label, policy))
        }
    }

    /// Run a directive's commands; a failing required command ends it
    async fn run_directive(&self, directive: &Directive) -> Result<StepResult> {
        self.presenter.on_step_started(&directive.label).await;

        let mut text = String::new();
        let mut succeeded = true;
        for invocation in &directive.commands {
            let output = self.runner.run(invocation).await?;
            text.push_str(&invocation.redact(&output.text));
            if !output.success {
                if invocation.is_best_effort() {
                    debug!(command = %invocation, "best-effort command failed, ignoring");
                    continue;
                }
                succeeded = false;
                break;
            }
        }
        Ok(StepResult::new(directive.label.clone(), text, succeeded))
    }

    async fn record(&self, report: &mut RebaseReport, step: StepResult) {
        self.presenter.on_step(&step).await;
        report.steps.push(step);
    }

    async fn enter(&self, report: &mut RebaseReport, state: PipelineState) {
        info!(%state, "pipeline state");
        report.final_state = state;
        self.presenter.on_state(state).await;
    }
}

fn apply_policy(report: &mut RebaseReport, label: &str, policy: StepPolicy) -> Flow {
    match policy {
        StepPolicy::ContinueOnError => {
            warn!(step = label, "step failed, continuing");
            Flow::Proceed
        }
        StepPolicy::AbortOnError => {
            warn!(step = label, "step failed, aborting");
            report.aborted_at = Some(label.to_string());
            Flow::Stop
        }
    }
}
