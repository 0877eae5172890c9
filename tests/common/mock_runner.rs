//! Mock process runner and recording presenter for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use force_rebase::error::{Error, Result};
use force_rebase::git::{CommandOutput, Invocation, ProcessRunner};
use force_rebase::rebase::Presenter;
use force_rebase::types::{PipelineState, StepResult};
use std::sync::Mutex;
use std::time::Duration;

/// Record of one `run` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCall {
    /// Redacted rendering, as it would be logged
    pub display: String,
    /// Real arguments
    pub args: Vec<String>,
    /// Extra environment
    pub env: Vec<(String, String)>,
}

/// Scripted stand-in for git
///
/// Commands whose redacted rendering contains a registered pattern get that
/// pattern's output; everything else succeeds with empty output.
pub struct ScriptedRunner {
    responses: Mutex<Vec<(String, CommandOutput)>>,
    spawn_failures: Mutex<Vec<String>>,
    calls: Mutex<Vec<RunCall>>,
    delay: Duration,
}

impl ScriptedRunner {
    /// Runner where every command succeeds silently
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            spawn_failures: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Runner that sleeps before answering each command
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    // === Scripting ===

    /// Answer commands containing `pattern` with successful `text`
    pub fn respond(&self, pattern: &str, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push((pattern.to_string(), CommandOutput::ok(text)));
    }

    /// Answer commands containing `pattern` with a non-zero exit and `text`
    pub fn fail(&self, pattern: &str, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push((pattern.to_string(), CommandOutput::failed(text)));
    }

    /// Make commands containing `pattern` fail to spawn
    pub fn fail_spawn(&self, pattern: &str) {
        self.spawn_failures.lock().unwrap().push(pattern.to_string());
    }

    // === Call verification ===

    /// Every call, in order
    pub fn calls(&self) -> Vec<RunCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Redacted renderings of every call, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.display).collect()
    }

    /// Number of calls whose rendering contains `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }

    /// First call whose rendering contains `pattern`
    pub fn find(&self, pattern: &str) -> Option<RunCall> {
        self.calls().into_iter().find(|c| c.display.contains(pattern))
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let display = invocation.to_string();
        self.calls.lock().unwrap().push(RunCall {
            display: display.clone(),
            args: invocation.raw_args().to_vec(),
            env: invocation.envs().to_vec(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self
            .spawn_failures
            .lock()
            .unwrap()
            .iter()
            .any(|p| display.contains(p.as_str()))
        {
            return Err(Error::Spawn {
                command: display,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            });
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .iter()
            .find(|(p, _)| display.contains(p.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| CommandOutput::ok("")))
    }
}

/// Presenter that remembers everything it was shown
#[derive(Default)]
pub struct RecordingPresenter {
    states: Mutex<Vec<PipelineState>>,
    started: Mutex<Vec<String>>,
    steps: Mutex<Vec<StepResult>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<PipelineState> {
        self.states.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<StepResult> {
        self.steps.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.steps().into_iter().map(|s| s.label).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn on_state(&self, state: PipelineState) {
        self.states.lock().unwrap().push(state);
    }

    async fn on_step_started(&self, label: &str) {
        self.started.lock().unwrap().push(label.to_string());
    }

    async fn on_step(&self, step: &StepResult) {
        self.steps.lock().unwrap().push(step.clone());
    }

    async fn on_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
