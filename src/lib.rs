//! force-rebase - rebase Gerrit changes onto their target branch
//!
//! Takes the "download patch" command Gerrit shows for a change, fetches the
//! patch into a local mirror, force-rebases it onto `master`/`main` and pushes
//! the result back for review.

pub mod auth;
pub mod config;
pub mod error;
pub mod git;
pub mod rebase;
pub mod repo;
pub mod request;
pub mod secrets;
pub mod types;
