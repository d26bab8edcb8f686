//! Customer session state.
//!
//! The session holds the bearer token issued by the remote API and the
//! customer id it belongs to. Handlers never touch the cookie session
//! directly: they take a [`SessionContext`], which owns the only code paths
//! that create or destroy the identity and announces every change on
//! [`SessionEvents`].

use std::fmt;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{StatusCode, request::Parts};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower_sessions::Session;

use orfarm_core::CustomerId;

use crate::api::AuthGrant;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};

/// Session key for the signed-in customer.
pub const AUTH_KEY: &str = "auth";

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Identity stored in the session after login or registration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    token: String,
    pub user_id: CustomerId,
}

impl AuthSession {
    #[must_use]
    pub fn from_grant(grant: &AuthGrant) -> Self {
        use secrecy::ExposeSecret;
        Self {
            token: grant.token.expose_secret().to_string(),
            user_id: grant.user_id,
        }
    }

    /// Bearer token for authenticated API calls.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

// =============================================================================
// Events
// =============================================================================

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The customer logged out.
    Logout,
    /// The remote API rejected the stored token.
    Rejected,
}

impl fmt::Display for SignOutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logout => f.write_str("logout"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// A change to some customer's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn {
        user_id: CustomerId,
    },
    SignedOut {
        user_id: Option<CustomerId>,
        reason: SignOutReason,
    },
}

/// Broadcast channel for session changes.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

/// Log every session change until the channel closes.
pub async fn audit_session_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::SignedIn { user_id }) => {
                tracing::info!(%user_id, "Customer signed in");
            }
            Ok(SessionEvent::SignedOut { user_id, reason }) => {
                tracing::info!(user_id = ?user_id, %reason, "Customer signed out");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Session audit lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Per-request handle on the customer's session.
#[derive(Clone)]
pub struct SessionContext {
    session: Session,
    events: SessionEvents,
}

impl SessionContext {
    #[must_use]
    pub const fn new(session: Session, events: SessionEvents) -> Self {
        Self { session, events }
    }

    /// The signed-in identity, if any. An unreadable entry counts as none.
    pub async fn get(&self) -> Option<AuthSession> {
        match self.session.get::<AuthSession>(AUTH_KEY).await {
            Ok(auth) => auth,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth session");
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get().await.is_some()
    }

    /// Store a freshly issued identity. The session id is rotated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn set(&self, auth: AuthSession) -> Result<(), tower_sessions::session::Error> {
        self.session.cycle_id().await?;
        self.session.insert(AUTH_KEY, &auth).await?;

        set_sentry_user(&auth.user_id, None);
        add_breadcrumb("auth", "Signed in", None);
        self.events
            .publish(SessionEvent::SignedIn { user_id: auth.user_id });
        Ok(())
    }

    /// Destroy the session. Used for logout and for any authenticated call
    /// the API rejects; afterwards the two cases are indistinguishable.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails to delete the session.
    pub async fn clear(&self, reason: SignOutReason) -> Result<(), tower_sessions::session::Error> {
        let user_id = self.get().await.map(|auth| auth.user_id);
        self.session.flush().await?;

        let reason_text = reason.to_string();
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", Some(&[("reason", reason_text.as_str())]));
        self.events
            .publish(SessionEvent::SignedOut { user_id, reason });
        Ok(())
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    SessionEvents: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session layer missing",
        ))?;

        Ok(Self::new(session, SessionEvents::from_ref(state)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn context(events: &SessionEvents) -> SessionContext {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        SessionContext::new(session, events.clone())
    }

    fn auth(id: i64) -> AuthSession {
        AuthSession {
            token: "tok-123".to_string(),
            user_id: CustomerId::new(id),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", auth(1));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("tok-123"));
    }

    #[tokio::test]
    async fn test_set_then_clear_publishes_events() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();
        let ctx = context(&events);

        assert!(!ctx.is_authenticated().await);

        ctx.set(auth(42)).await.unwrap();
        assert_eq!(ctx.get().await.unwrap().user_id, CustomerId::new(42));
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedIn {
                user_id: CustomerId::new(42)
            }
        );

        ctx.clear(SignOutReason::Rejected).await.unwrap();
        assert!(ctx.get().await.is_none());
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedOut {
                user_id: Some(CustomerId::new(42)),
                reason: SignOutReason::Rejected,
            }
        );
    }

    #[tokio::test]
    async fn test_clear_without_session() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();
        let ctx = context(&events);

        ctx.clear(SignOutReason::Logout).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedOut {
                user_id: None,
                reason: SignOutReason::Logout,
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers() {
        SessionEvents::new().publish(SessionEvent::SignedIn {
            user_id: CustomerId::new(1),
        });
    }
}
