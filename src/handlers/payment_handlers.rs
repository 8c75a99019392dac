use crate::calendar::{self, DATE_FORMAT};
use crate::error::{AppError, Result};
use crate::identity::derive_student_id;
use crate::middleware::session_auth::{current_user, school_scope};
use crate::models::fee_profile::EffectiveFees;
use crate::models::payment::PaymentRecord;
use crate::services::ledger_service::{FeeKind, PaymentSubmission, RecordEdit, StudentHistory};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct PaymentForm {
    pub student_name: String,
    pub class_category: String,
    #[serde(default)]
    pub class_section: String,
    pub fee_kind: FeeKind,
    #[serde(default)]
    pub months: Vec<String>,
    pub amount: i64,
    pub received_amount: Option<i64>,
    pub payment_method: String,
    pub payment_date: String,
    pub signature: String,
}

#[derive(Deserialize)]
pub struct StudentStatusQuery {
    pub student_name: String,
    pub class_category: String,
    /// Defaults to today; drives which academic year the annual/admission
    /// checks look at.
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct StudentStatusResponse {
    pub student_id: String,
    pub academic_year: String,
    pub unpaid_months: Vec<String>,
    pub annual_paid: bool,
    pub admission_paid: bool,
    pub effective_fees: EffectiveFees,
    pub history: StudentHistory,
}

pub async fn record_payment(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<PaymentForm>,
) -> Result<(StatusCode, Json<Vec<PaymentRecord>>)> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;

    let payment_date = parse_date(&form.payment_date)?;
    let submission = PaymentSubmission {
        student_name: form.student_name,
        class_category: form.class_category,
        class_section: form.class_section,
        fee_kind: form.fee_kind,
        months: form.months,
        amount: form.amount,
        received_amount: form.received_amount.unwrap_or(form.amount),
        payment_method: form.payment_method,
        payment_date,
        signature: form.signature,
    };

    let records = state.ledger_service.record_payment(&school, submission).await?;
    Ok((StatusCode::CREATED, Json(records)))
}

/// Everything the fee form shows after "Check Student Records": history,
/// unpaid months, annual/admission status for the date's academic year, and
/// the amounts to pre-fill.
pub async fn student_status(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StudentStatusQuery>,
) -> Result<Json<StudentStatusResponse>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;

    if query.student_name.trim().is_empty() || query.class_category.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter Student Name and select Class Category".to_string(),
        ));
    }

    let date = match &query.date {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let student_id = derive_student_id(&query.student_name, &query.class_category);
    let academic_year = calendar::academic_year_for(date);

    let unpaid_months = state.ledger_service.unpaid_months(&school, &student_id).await?;
    let (annual_paid, admission_paid) = state
        .ledger_service
        .annual_admission_paid(&school, &student_id, &academic_year)
        .await?;
    let effective_fees = state.fee_service.effective_fees(&school, &student_id).await?;
    let history = state.ledger_service.student_history(&school, &student_id).await?;

    Ok(Json(StudentStatusResponse {
        student_id,
        academic_year,
        unpaid_months,
        annual_paid,
        admission_paid,
        effective_fees,
        history,
    }))
}

pub async fn unpaid_months(
    State(state): State<AppState>,
    session: Session,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<String>>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let months = state.ledger_service.unpaid_months(&school, &student_id).await?;
    Ok(Json(months))
}

pub async fn list_records(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<PaymentRecord>>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let records = state.ledger_service.list_records(&school).await?;
    Ok(Json(records))
}

pub async fn update_record(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(edit): Json<RecordEdit>,
) -> Result<Json<PaymentRecord>> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    let record = state.ledger_service.update_record(&school, id, edit).await?;
    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let user = current_user(&session).await?;
    let school = school_scope(&user)?;
    state.ledger_service.delete_record(&school, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date (expected YYYY-MM-DD): {raw}")))
}
