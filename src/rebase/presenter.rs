//! Presenter trait for interface-agnostic step reporting
//!
//! The orchestrator streams every step result to a presenter as soon as it
//! is known, so a terminal, a web page or a test recorder can show progress.

use crate::error::Error;
use crate::types::{PipelineState, StepResult};
use async_trait::async_trait;

/// Receives pipeline progress
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Called on each state machine transition
    async fn on_state(&self, state: PipelineState);

    /// Called before a step's commands run
    async fn on_step_started(&self, label: &str);

    /// Called with each finished step, in order
    async fn on_step(&self, step: &StepResult);

    /// Called when the run stops on a fatal error
    async fn on_error(&self, error: &Error);
}

/// No-op presenter for when progress isn't needed
pub struct NoopPresenter;

#[async_trait]
impl Presenter for NoopPresenter {
    async fn on_state(&self, _state: PipelineState) {}
    async fn on_step_started(&self, _label: &str) {}
    async fn on_step(&self, _step: &StepResult) {}
    async fn on_error(&self, _error: &Error) {}
}
