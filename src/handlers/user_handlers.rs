use crate::error::Result;
use crate::middleware::session_auth::current_user;
use crate::models::user::Role;
use crate::services::user_service::{CreateUserRequest, UserSummary};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct CreateUserForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub sub_admin: bool,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub school_name: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CreateUserForm>,
) -> Result<(StatusCode, Json<CreatedUserResponse>)> {
    let actor = current_user(&session).await?.to_auth_session();

    let user = state
        .user_service
        .create_user(
            &actor,
            CreateUserRequest {
                username: form.username,
                password: form.password,
                password_confirm: Some(form.password_confirm),
                email: form.email,
                sub_admin: form.sub_admin,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            username: user.username,
            email: user.email,
            role: user.role,
            school_name: user.school_name,
        }),
    ))
}

pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<UserSummary>>> {
    let actor = current_user(&session).await?.to_auth_session();
    let users = state.user_service.list_users(&actor).await?;
    Ok(Json(users))
}

pub async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    let actor = current_user(&session).await?.to_auth_session();
    state.user_service.delete_user(&actor, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
    Json(form): Json<ResetPasswordForm>,
) -> Result<StatusCode> {
    let actor = current_user(&session).await?.to_auth_session();
    state
        .user_service
        .reset_password(
            &actor,
            &username,
            &form.new_password,
            Some(&form.new_password_confirm),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
