//! Auth guard: attaches the bearer token to outgoing requests and reacts to
//! `401 Unauthorized` by invalidating the stored credentials.
//!
//! The guard is composed explicitly by the HTTP services; nothing intercepts
//! requests behind their back. UI code subscribes to [`AuthEvent`]s to route
//! the user back to the login entry point.

use reqwest::{RequestBuilder, StatusCode};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::credentials::{CredentialStore, Credentials};
use crate::error::AuthError;

/// Path of the login entry point
pub const LOGIN_ROUTE: &str = "/login";

/// Authentication lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Credentials were stored after login or registration
    SignedIn { user_id: Option<String> },
    /// User logged out explicitly
    SignedOut,
    /// The server rejected the token; the UI should redirect to `login_route`
    SessionExpired { login_route: &'static str },
}

/// Shared auth layer
#[derive(Debug, Clone)]
pub struct AuthGuard {
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { store, events }
    }

    /// Subscribe to auth events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Currently stored credentials, if readable
    pub fn credentials(&self) -> Option<Credentials> {
        match self.store.load() {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!("Failed to read stored credentials: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.credentials().map(|c| c.access_token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Identity used to open the tutor channel
    pub fn user_id(&self) -> Option<String> {
        self.credentials()
            .and_then(|c| c.user.map(|u| u.id))
            .filter(|id| !id.trim().is_empty())
    }

    /// Attach `Authorization: Bearer <token>` when a token is stored
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Inspect a response status.
    ///
    /// Returns `true` when the status is 401, after invalidating the stored
    /// credentials and broadcasting [`AuthEvent::SessionExpired`].
    pub fn observe(&self, status: StatusCode) -> bool {
        if status != StatusCode::UNAUTHORIZED {
            return false;
        }
        tracing::warn!("Server rejected credentials, invalidating session");
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear stored credentials: {}", e);
        }
        let _ = self.events.send(AuthEvent::SessionExpired {
            login_route: LOGIN_ROUTE,
        });
        true
    }

    /// Persist freshly issued credentials
    pub fn sign_in(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.store.save(credentials)?;
        let _ = self.events.send(AuthEvent::SignedIn {
            user_id: credentials.user_id().map(str::to_string),
        });
        Ok(())
    }

    /// Forget the stored credentials
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.store.clear()?;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{MemoryCredentialStore, UserProfile};

    fn guard_with_token() -> (AuthGuard, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::with_credentials(
            Credentials::new("tok").with_user(UserProfile {
                id: "u1".to_string(),
                name: String::new(),
                email: String::new(),
                email_verified: false,
            }),
        ));
        (AuthGuard::new(store.clone()), store)
    }

    #[test]
    fn test_authorize_attaches_bearer() {
        let (guard, _) = guard_with_token();
        let client = reqwest::Client::new();
        let request = guard
            .authorize(client.get("http://localhost/goals"))
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn test_authorize_without_token() {
        let guard = AuthGuard::new(Arc::new(MemoryCredentialStore::new()));
        let client = reqwest::Client::new();
        let request = guard
            .authorize(client.get("http://localhost/goals"))
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());
        assert!(guard.user_id().is_none());
    }

    #[test]
    fn test_unauthorized_invalidates_and_notifies() {
        let (guard, store) = guard_with_token();
        let mut events = guard.subscribe();

        assert!(!guard.observe(StatusCode::OK));
        assert!(!guard.observe(StatusCode::NOT_FOUND));
        assert!(guard.is_authenticated());

        assert!(guard.observe(StatusCode::UNAUTHORIZED));
        assert!(store.load().unwrap().is_none());
        assert_eq!(
            events.try_recv().unwrap(),
            AuthEvent::SessionExpired {
                login_route: LOGIN_ROUTE
            }
        );
    }

    #[test]
    fn test_sign_in_and_out() {
        let guard = AuthGuard::new(Arc::new(MemoryCredentialStore::new()));
        let mut events = guard.subscribe();

        guard.sign_in(&Credentials::new("abc")).unwrap();
        assert_eq!(guard.token().as_deref(), Some("abc"));
        assert_eq!(
            events.try_recv().unwrap(),
            AuthEvent::SignedIn { user_id: None }
        );

        guard.sign_out().unwrap();
        assert!(!guard.is_authenticated());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
    }
}
