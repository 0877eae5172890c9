//! Git command construction and execution
//!
//! Commands are built as argument vectors ([`Invocation`]) by the
//! [`CommandBuilder`] and executed by a [`ProcessRunner`].

pub mod commands;
mod invocation;
mod runner;

pub use commands::{CommandBuilder, Directive, PushTemplate};
pub use invocation::{Invocation, SECRET_PLACEHOLDER};
pub use runner::{CommandOutput, ProcessRunner, SystemRunner};
