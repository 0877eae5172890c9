//! Rebase orchestration
//!
//! Turns a validated [`crate::types::RebaseRequest`] into git invocations,
//! runs them in order, and continues once through conflicts.

mod conflict;
mod orchestrator;
mod presenter;

pub use conflict::{ConflictDetector, SubstringConflictDetector, CONFLICT_MARKER};
pub use orchestrator::{RebaseOrchestrator, StepPolicy};
pub use presenter::{NoopPresenter, Presenter};
