//! Login, registration and logout.
//!
//! Forms are validated before any network call. On success the issued
//! token is stored through [`SessionContext`] and the customer is sent to
//! their account; on failure the page is re-rendered with the submitted
//! values (never the passwords) and the errors.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::filters;
use crate::forms::{FieldErrors, LoginForm, RegisterForm};
use crate::routes::layout::Shell;
use crate::session::{AuthSession, SessionContext, SignOutReason};
use crate::state::AppState;

/// Where a successful login or registration lands.
pub const ACCOUNT_PATH: &str = "/account";

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Query parameters for the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Login and registration page.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub shell: Shell,
    pub notice: Option<String>,
    pub login: LoginForm,
    pub login_errors: FieldErrors,
    pub login_error: Option<String>,
    pub register: RegisterForm,
    pub register_errors: FieldErrors,
    pub register_error: Option<String>,
}

impl LoginPageTemplate {
    async fn new(state: &AppState) -> Self {
        Self {
            shell: Shell::load(state, false).await,
            notice: None,
            login: LoginForm::default(),
            login_errors: FieldErrors::default(),
            login_error: None,
            register: RegisterForm::default(),
            register_errors: FieldErrors::default(),
            register_error: None,
        }
    }
}

fn rejected(page: LoginPageTemplate) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Display the login and registration forms. Signed-in customers go
/// straight to their account.
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<LoginQuery>,
) -> Response {
    if session.is_authenticated().await {
        return Redirect::to(ACCOUNT_PATH).into_response();
    }

    let mut page = LoginPageTemplate::new(&state).await;
    page.notice = query
        .error
        .filter(|e| e == "session_expired")
        .map(|_| SESSION_EXPIRED.to_string());
    page.into_response()
}

/// Handle a login submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            debug!(fields = ?errors.keys(), "Login form rejected");
            let mut page = LoginPageTemplate::new(&state).await;
            page.login = form.draft();
            page.login_errors = errors;
            return Ok(rejected(page));
        }
    };

    match state.api().login(&credentials).await {
        Ok(grant) => {
            session.set(AuthSession::from_grant(&grant)).await?;
            info!(user_id = %grant.user_id, "Login succeeded");
            Ok(Redirect::to(ACCOUNT_PATH).into_response())
        }
        Err(e) => {
            warn!(error = %e, "Login failed");
            let mut page = LoginPageTemplate::new(&state).await;
            page.login = form.draft();
            page.login_error = Some(e.user_message(LOGIN_FAILED));
            Ok(rejected(page))
        }
    }
}

/// Handle a registration submission.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let details = match form.validate() {
        Ok(details) => details,
        Err(errors) => {
            debug!(fields = ?errors.keys(), "Registration form rejected");
            let mut page = LoginPageTemplate::new(&state).await;
            page.register = form.draft();
            page.register_errors = errors;
            return Ok(rejected(page));
        }
    };

    match state.api().signup(&details).await {
        Ok(grant) => {
            session.set(AuthSession::from_grant(&grant)).await?;
            info!(user_id = %grant.user_id, "Registration succeeded");
            Ok(Redirect::to(ACCOUNT_PATH).into_response())
        }
        Err(e) => {
            warn!(error = %e, "Registration failed");
            let mut page = LoginPageTemplate::new(&state).await;
            page.register = form.draft();
            page.register_error = Some(e.user_message(REGISTRATION_FAILED));
            Ok(rejected(page))
        }
    }
}

/// Log out and return to the login page.
#[instrument(skip(session))]
pub async fn logout(session: SessionContext) -> Result<Redirect> {
    session.clear(SignOutReason::Logout).await?;
    Ok(Redirect::to(crate::middleware::auth::LOGIN_PATH))
}
