use crate::error::AppError;
use crate::models::user::Role;
use crate::school::school_slug;
use crate::services::auth_service::AuthSession;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

pub const SESSION_USER_KEY: &str = "session_user";

/// The logged-in account as carried in the signed session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub role: Role,
    pub school_name: Option<String>,
}

impl From<&AuthSession> for SessionUser {
    fn from(auth: &AuthSession) -> Self {
        Self {
            username: auth.username.clone(),
            role: auth.role,
            school_name: auth.school_name.clone(),
        }
    }
}

impl SessionUser {
    /// The acting session as the service layer sees it. The trial countdown
    /// is not carried in the cookie; it only matters at login time.
    pub fn to_auth_session(&self) -> AuthSession {
        AuthSession {
            username: self.username.clone(),
            role: self.role,
            school_name: self.school_name.clone(),
            trial_remaining_secs: 0,
        }
    }
}

/// The logged-in user, or a 401 error for anonymous requests.
pub async fn current_user(session: &Session) -> Result<SessionUser, AppError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("session load failed: {e}")))?
        .ok_or_else(AppError::unauthenticated)
}

/// The school scope the user operates in. Accounts without a school (a
/// plain user that was never attached to one) cannot touch ledger data.
pub fn school_scope(user: &SessionUser) -> Result<String, AppError> {
    user.school_name
        .as_deref()
        .map(school_slug)
        .filter(|slug| !slug.is_empty())
        .ok_or_else(|| {
            AppError::Validation("No school is associated with this account".to_string())
        })
}

pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(Some(_)) => next.run(request).await,
        _ => AppError::unauthenticated().into_response(),
    }
}

pub async fn require_admin(session: Session, request: Request, next: Next) -> Response {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(Some(user)) if user.role.is_admin() => next.run(request).await,
        Ok(Some(_)) => AppError::access_denied().into_response(),
        _ => AppError::unauthenticated().into_response(),
    }
}
