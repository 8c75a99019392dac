use crate::error::{AppError, Result};
use crate::middleware::session_auth::{current_user, SessionUser, SESSION_USER_KEY};
use crate::models::user::Role;
use crate::services::auth_service::{AuthSession, LoginRequest};
use crate::services::user_service::SignupRequest;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub school_name: Option<String>,
    #[serde(default)]
    pub admin_owner: bool,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub username: String,
    pub role: Role,
    pub school_name: Option<String>,
    pub trial_remaining: String,
    pub trial_remaining_secs: i64,
}

impl From<&AuthSession> for SessionResponse {
    fn from(auth: &AuthSession) -> Self {
        Self {
            username: auth.username.clone(),
            role: auth.role,
            school_name: auth.school_name.clone(),
            trial_remaining: auth.format_trial_remaining(),
            trial_remaining_secs: auth.trial_remaining_secs,
        }
    }
}

/// Sign up and log straight in, the way the signup form behaves.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<SignupForm>,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .signup(SignupRequest {
            username: form.username.clone(),
            password: form.password.clone(),
            password_confirm: Some(form.password_confirm),
            email: form.email,
            school_name: form.school_name,
            admin_owner: form.admin_owner,
        })
        .await?;

    let auth = state
        .auth_service
        .authenticate(LoginRequest {
            username: form.username,
            password: form.password,
        })
        .await?;

    establish_session(&session, &auth).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(&auth))))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<SessionResponse>> {
    let auth = state
        .auth_service
        .authenticate(LoginRequest {
            username: form.username,
            password: form.password,
        })
        .await?;

    establish_session(&session, &auth).await?;

    Ok(Json(SessionResponse::from(&auth)))
}

pub async fn logout(session: Session) -> Result<StatusCode> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session_info(session: Session) -> Result<Json<SessionUser>> {
    let user = current_user(&session).await?;
    Ok(Json(user))
}

async fn establish_session(session: &Session, auth: &AuthSession) -> Result<()> {
    // Fresh session id on every login
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session cycle failed: {e}")))?;
    session
        .insert(SESSION_USER_KEY, SessionUser::from(auth))
        .await
        .map_err(|e| AppError::Internal(format!("session store failed: {e}")))?;
    Ok(())
}
