//! Authentication extractors.
//!
//! Both read the identity through [`SessionContext`], so handlers see the
//! same state the login and logout paths write.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::{AuthSession, SessionContext, SessionEvents};

/// Where unauthenticated customers are sent.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a signed-in customer.
///
/// Anyone without a session is redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Customer {}", auth.user_id)
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub struct RedirectToLogin;

impl IntoResponse for RedirectToLogin {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    SessionEvents: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionContext::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        session
            .get()
            .await
            .map(Self)
            .ok_or_else(|| RedirectToLogin.into_response())
    }
}

/// Extractor for the identity if there is one.
pub struct OptionalAuth(pub Option<AuthSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    SessionEvents: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = match SessionContext::from_request_parts(parts, state).await {
            Ok(session) => session.get().await,
            Err(_) => None,
        };
        Ok(Self(auth))
    }
}
