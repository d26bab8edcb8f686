//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use orfarm_core::UserProfile;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::layout::Shell;
use crate::session::{SessionContext, SignOutReason};
use crate::state::AppState;

/// Login page with the expired-session notice.
pub const SESSION_EXPIRED_PATH: &str = "/login?error=session_expired";

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub shell: Shell,
    pub greeting: String,
    pub profile: UserProfile,
}

/// Display the account overview.
///
/// A token the API no longer accepts ends the session and sends the
/// customer back to log in.
#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn index(
    State(state): State<AppState>,
    session: SessionContext,
    RequireAuth(auth): RequireAuth,
) -> Result<Response> {
    let profile = match state.api().profile(&auth.token()).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "Profile rejected, ending session");
            session.clear(SignOutReason::Rejected).await?;
            return Ok(Redirect::to(SESSION_EXPIRED_PATH).into_response());
        }
    };

    Ok(AccountIndexTemplate {
        shell: Shell::load(&state, true).await,
        greeting: format!("Hello, {}", profile.first_name()),
        profile,
    }
    .into_response())
}
