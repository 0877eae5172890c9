//! Pre-shared operator tokens

use crate::auth::{Authenticator, Session, SessionState};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;

/// Authenticates operators by exchanging a configured token for their name
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    login_url: String,
    tokens: HashMap<String, String>,
}

impl TokenAuthenticator {
    /// Create from a login URL and a token -> operator map
    pub const fn new(login_url: String, tokens: HashMap<String, String>) -> Self {
        Self { login_url, tokens }
    }

    /// Create from the `auth` config section
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.login_url.clone(), config.tokens.clone())
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn current_identity(&self, session: &Session) -> Result<String> {
        session
            .identity()
            .map(ToString::to_string)
            .ok_or(Error::NotAuthenticated)
    }

    async fn begin_login(&self, session: &mut Session) -> Result<String> {
        if self.login_url.is_empty() {
            return Err(Error::Auth("no login URL configured".to_string()));
        }
        session.set_state(SessionState::Pending);
        Ok(self.login_url.clone())
    }

    async fn complete_login(&self, session: &mut Session, verifier: &str) -> Result<()> {
        let identity = self
            .tokens
            .get(verifier.trim())
            .ok_or_else(|| Error::Auth("invalid login token".to_string()))?;

        tracing::info!(session = %session.id(), %identity, "operator logged in");
        session.set_state(SessionState::Authenticated {
            identity: identity.clone(),
            since: Utc::now(),
        });
        Ok(())
    }

    async fn log_out(&self, session: &mut Session) {
        tracing::debug!(session = %session.id(), "logging out");
        session.set_state(SessionState::Anonymous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> TokenAuthenticator {
        let mut tokens = HashMap::new();
        tokens.insert("t0k3n".to_string(), "Alice".to_string());
        TokenAuthenticator::new("https://login.example.org".to_string(), tokens)
    }

    #[tokio::test]
    async fn test_anonymous_session_is_not_authenticated() {
        let auth = authenticator();
        let session = Session::new();
        assert!(matches!(
            auth.current_identity(&session).await,
            Err(Error::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_login_lifecycle() {
        let auth = authenticator();
        let mut session = Session::new();

        let url = auth.begin_login(&mut session).await.unwrap();
        assert_eq!(url, "https://login.example.org");
        assert_eq!(session.state(), &SessionState::Pending);
        assert!(auth.current_identity(&session).await.is_err());

        auth.complete_login(&mut session, "t0k3n").await.unwrap();
        assert_eq!(auth.current_identity(&session).await.unwrap(), "Alice");

        auth.log_out(&mut session).await;
        assert!(matches!(
            auth.current_identity(&session).await,
            Err(Error::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let auth = authenticator();
        let mut session = Session::new();
        let err = auth.complete_login(&mut session, "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_begin_login_requires_url() {
        let auth = TokenAuthenticator::new(String::new(), HashMap::new());
        let mut session = Session::new();
        assert!(auth.begin_login(&mut session).await.is_err());
        assert_eq!(session.state(), &SessionState::Anonymous);
    }
}
