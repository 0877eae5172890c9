//! Operator authentication
//!
//! A rebase only runs for an authenticated operator. Login state lives in an
//! explicit [`Session`] value instead of ambient storage.

mod token;

pub use token::TokenAuthenticator;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Where a session is in the login flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No login attempted
    Anonymous,
    /// `begin_login` issued a redirect, waiting for the verifier
    Pending,
    /// Logged in as the named operator
    Authenticated {
        /// Operator name, display only
        identity: String,
        /// When login completed
        since: DateTime<Utc>,
    },
}

/// Login state for one caller
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    state: SessionState,
}

impl Session {
    /// Fresh anonymous session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Anonymous,
        }
    }

    /// Session id
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current login state
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Logged-in identity, if any
    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves who is asking for a rebase
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Identity of the logged-in operator, or [`crate::error::Error::NotAuthenticated`]
    async fn current_identity(&self, session: &Session) -> Result<String>;

    /// Start logging in; returns the URL to send the operator to
    async fn begin_login(&self, session: &mut Session) -> Result<String>;

    /// Finish logging in with the verifier handed back by the login provider
    async fn complete_login(&self, session: &mut Session, verifier: &str) -> Result<()>;

    /// Forget the session's login
    async fn log_out(&self, session: &mut Session);
}
