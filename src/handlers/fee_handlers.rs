use crate::error::Result;
use crate::middleware::session_auth::{current_user, school_scope};
use crate::models::fee_profile::{EffectiveFees, FeeProfile};
use crate::services::fee_service::SetFeesRequest;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tower_sessions::Session;

pub async fn set_fees(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SetFeesRequest>,
) -> Result<(StatusCode, Json<FeeProfile>)> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let profile = state.fee_service.set_fees(&school, request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn list_fees(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<FeeProfile>>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let profiles = state.fee_service.list_fees(&school).await?;
    Ok(Json(profiles))
}

pub async fn update_fees(
    State(state): State<AppState>,
    session: Session,
    Path(student_id): Path<String>,
    Json(request): Json<SetFeesRequest>,
) -> Result<Json<FeeProfile>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let profile = state
        .fee_service
        .update_fees(&school, &student_id, request)
        .await?;
    Ok(Json(profile))
}

pub async fn delete_fees(
    State(state): State<AppState>,
    session: Session,
    Path(student_id): Path<String>,
) -> Result<StatusCode> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    state.fee_service.delete_fees(&school, &student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The amounts a payment form should be pre-filled with for one student.
pub async fn effective_fees(
    State(state): State<AppState>,
    session: Session,
    Path(student_id): Path<String>,
) -> Result<Json<EffectiveFees>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let fees = state
        .fee_service
        .effective_fees(&school, &student_id)
        .await?;
    Ok(Json(fees))
}
