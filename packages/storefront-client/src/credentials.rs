//! Session credentials with secure memory.
//!
//! Auth tokens are wrapped in `secrecy` so they never leak into logs,
//! `Debug` output, or error messages. Tokens are looked up per session from
//! an injected [`CredentialStore`] instead of ambient global state.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A bearer token; `Debug` output is redacted by `secrecy`.
#[derive(Clone, Debug)]
pub struct AuthToken(SecretString);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// The raw value, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Local credential store keyed by session id.
pub trait CredentialStore: Send + Sync {
    /// Token for the session, if the user is logged in.
    fn token(&self, session_id: &str) -> Option<AuthToken>;
}

/// In-memory credential store.
#[derive(Default, Clone)]
pub struct MemoryCredentialStore {
    tokens: Arc<RwLock<HashMap<String, AuthToken>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token for a session, replacing any previous one.
    pub fn login(&self, session_id: impl Into<String>, token: impl Into<String>) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(session_id.into(), AuthToken::new(token));
        }
    }

    /// Drop the session's token.
    pub fn logout(&self, session_id: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(session_id);
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self, session_id: &str) -> Option<AuthToken> {
        self.tokens.read().ok()?.get(session_id).cloned()
    }
}

/// Accessor handed to listing view models; read once per fetch cycle.
pub trait TokenSource: Send + Sync {
    fn auth_token(&self) -> Option<AuthToken>;
}

/// Reads the token for one session from a credential store.
#[derive(Clone)]
pub struct SessionCredentials {
    store: Arc<dyn CredentialStore>,
    session_id: String,
}

impl SessionCredentials {
    pub fn new(store: Arc<dyn CredentialStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
        }
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("session_id", &self.session_id)
            .finish()
    }
}

impl TokenSource for SessionCredentials {
    fn auth_token(&self) -> Option<AuthToken> {
        self.store.token(&self.session_id)
    }
}

/// Anonymous access: never yields a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn auth_token(&self) -> Option<AuthToken> {
        None
    }
}

impl TokenSource for AuthToken {
    fn auth_token(&self) -> Option<AuthToken> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_not_in_debug() {
        let token = AuthToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug = format!("{:?}", token);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret"));
        assert_eq!(token.expose(), "eyJhbGciOiJIUzI1NiJ9.secret");
        assert_eq!(token.clone().expose(), token.expose());
    }

    #[test]
    fn test_session_credentials_follow_store() {
        let store = MemoryCredentialStore::new();
        let creds = SessionCredentials::new(Arc::new(store.clone()), "session-a");
        assert!(creds.auth_token().is_none());

        store.login("session-a", "tok-a");
        store.login("session-b", "tok-b");
        assert_eq!(creds.auth_token().unwrap().expose(), "tok-a");

        store.logout("session-a");
        assert!(creds.auth_token().is_none());
    }

    #[test]
    fn test_anonymous_has_no_token() {
        assert!(Anonymous.auth_token().is_none());
    }
}
