use crate::error::Result;
use crate::middleware::session_auth::{current_user, school_scope};
use crate::services::report_service::{
    ClassSummary, MonthStatusReport, StudentOutstanding, YearlyReport,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct YearlyReportQuery {
    pub student_name: String,
    pub class_category: String,
}

pub async fn month_status(
    State(state): State<AppState>,
    session: Session,
    Path(month): Path<String>,
) -> Result<Json<MonthStatusReport>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let report = state.report_service.month_status(&school, &month).await?;
    Ok(Json(report))
}

pub async fn overall_status(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<StudentOutstanding>>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let summaries = state.report_service.overall_status(&school).await?;
    Ok(Json(summaries))
}

pub async fn class_summary(
    State(state): State<AppState>,
    session: Session,
    Path(class_category): Path<String>,
) -> Result<Json<ClassSummary>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let summary = state
        .report_service
        .class_summary(&school, &class_category)
        .await?;
    Ok(Json(summary))
}

pub async fn yearly_report(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<YearlyReportQuery>,
) -> Result<Json<YearlyReport>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let report = state
        .report_service
        .yearly_report(&school, &query.student_name, &query.class_category)
        .await?;
    Ok(Json(report))
}
