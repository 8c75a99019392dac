use crate::calendar::{self, ADMISSION, ANNUAL, MONTHS};
use crate::models::fee_profile::{FeeProfile, DEFAULT_MONTHLY_FEE};
use crate::models::payment::PaymentRecord;
use crate::repositories::{FeeProfileRepository, PaymentRepository, RepositoryError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("Unknown month: {0}")]
    UnknownMonth(String),
    #[error("No records found for this student")]
    NoRecords,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthStatusRow {
    pub student_id: String,
    pub student_name: String,
    pub class_category: String,
    pub monthly_fee: i64,
    pub amount_paid: i64,
    pub balance_due: i64,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthStatusReport {
    pub month: String,
    pub total_students: usize,
    pub paid_students: usize,
    pub unpaid_students: usize,
    pub total_outstanding: i64,
    pub rows: Vec<MonthStatusRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentOutstanding {
    pub student_id: String,
    pub student_name: String,
    pub class_category: String,
    pub unpaid_months: usize,
    pub total_outstanding: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthCollection {
    pub month: String,
    pub received: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub class_category: String,
    pub total_students: usize,
    pub total_received: i64,
    pub unpaid_students: usize,
    pub monthly_collection: Vec<MonthCollection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyMonthRow {
    pub month: String,
    pub monthly_fee: i64,
    pub received_amount: i64,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyReport {
    pub student_name: String,
    pub class_category: String,
    pub class_section: String,
    pub total_monthly_fee: i64,
    pub total_annual_charges: i64,
    pub total_admission_fee: i64,
    pub total_received: i64,
    pub months: Vec<YearlyMonthRow>,
}

/// A student as seen by the reports: first ledger appearance wins.
#[derive(Debug, Clone)]
struct KnownStudent {
    student_id: String,
    student_name: String,
    class_category: String,
}

pub struct ReportService {
    payments: Arc<dyn PaymentRepository>,
    fee_profiles: Arc<dyn FeeProfileRepository>,
}

impl ReportService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        fee_profiles: Arc<dyn FeeProfileRepository>,
    ) -> Self {
        Self {
            payments,
            fee_profiles,
        }
    }

    /// Paid/unpaid status of every known student for one month, with the
    /// balance estimated from the student's fee profile, falling back to
    /// their most recent positive monthly fee, then the school default.
    pub async fn month_status(
        &self,
        school: &str,
        month: &str,
    ) -> Result<MonthStatusReport, ReportServiceError> {
        if !calendar::is_month_name(month) {
            return Err(ReportServiceError::UnknownMonth(month.to_string()));
        }

        let records = self.ledger_or_empty(school).await;
        let profiles = self.profiles_by_student(school).await;
        let students = known_students(&records);

        let mut rows = Vec::with_capacity(students.len());
        for student in &students {
            let estimated = estimated_monthly_fee(&records, &profiles, &student.student_id);
            let month_rows: Vec<&PaymentRecord> = records
                .iter()
                .filter(|r| r.student_id == student.student_id && r.month == month)
                .collect();
            let paid = month_rows.iter().any(|r| r.monthly_fee > 0);
            let amount_paid = month_rows
                .iter()
                .filter(|r| r.monthly_fee > 0)
                .map(|r| r.received_amount)
                .sum();

            rows.push(MonthStatusRow {
                student_id: student.student_id.clone(),
                student_name: student.student_name.clone(),
                class_category: student.class_category.clone(),
                monthly_fee: estimated,
                amount_paid,
                balance_due: if paid { 0 } else { estimated },
                paid,
            });
        }

        let paid_students = rows.iter().filter(|r| r.paid).count();
        let total_outstanding = rows.iter().map(|r| r.balance_due).sum();

        Ok(MonthStatusReport {
            month: month.to_string(),
            total_students: rows.len(),
            paid_students,
            unpaid_students: rows.len() - paid_students,
            total_outstanding,
            rows,
        })
    }

    /// Per-student count of unpaid months and the outstanding total across
    /// the whole year.
    pub async fn overall_status(
        &self,
        school: &str,
    ) -> Result<Vec<StudentOutstanding>, ReportServiceError> {
        let records = self.ledger_or_empty(school).await;
        let profiles = self.profiles_by_student(school).await;
        let students = known_students(&records);

        let mut summaries = Vec::with_capacity(students.len());
        for student in &students {
            let paid: HashSet<&str> = records
                .iter()
                .filter(|r| r.student_id == student.student_id && r.monthly_fee > 0)
                .map(|r| r.month.as_str())
                .collect();
            let unpaid_months = MONTHS.iter().filter(|m| !paid.contains(**m)).count();
            let estimated = estimated_monthly_fee(&records, &profiles, &student.student_id);

            summaries.push(StudentOutstanding {
                student_id: student.student_id.clone(),
                student_name: student.student_name.clone(),
                class_category: student.class_category.clone(),
                unpaid_months,
                total_outstanding: unpaid_months as i64 * estimated,
            });
        }

        Ok(summaries)
    }

    /// Collection summary for one class category.
    pub async fn class_summary(
        &self,
        school: &str,
        class_category: &str,
    ) -> Result<ClassSummary, ReportServiceError> {
        let records = self.ledger_or_empty(school).await;
        let class_rows: Vec<&PaymentRecord> = records
            .iter()
            .filter(|r| r.class_category == class_category)
            .collect();

        let total_students = class_rows
            .iter()
            .map(|r| r.student_name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let total_received = class_rows.iter().map(|r| r.received_amount).sum();
        let unpaid_students = class_rows
            .iter()
            .filter(|r| r.monthly_fee == 0)
            .map(|r| r.student_name.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut by_month: HashMap<&str, i64> = HashMap::new();
        for record in &class_rows {
            *by_month.entry(record.month.as_str()).or_default() += record.received_amount;
        }
        let monthly_collection = MONTHS
            .iter()
            .copied()
            .chain([ANNUAL, ADMISSION])
            .filter_map(|month| {
                by_month.get(month).map(|&received| MonthCollection {
                    month: month.to_string(),
                    received,
                })
            })
            .collect();

        Ok(ClassSummary {
            class_category: class_category.to_string(),
            total_students,
            total_received,
            unpaid_students,
            monthly_collection,
        })
    }

    /// One student's twelve-month grid and fee totals. Students are looked
    /// up by name and class, the way the yearly report view selects them.
    pub async fn yearly_report(
        &self,
        school: &str,
        student_name: &str,
        class_category: &str,
    ) -> Result<YearlyReport, ReportServiceError> {
        let records = self.ledger_or_empty(school).await;
        let student_rows: Vec<&PaymentRecord> = records
            .iter()
            .filter(|r| r.student_name == student_name && r.class_category == class_category)
            .collect();

        if student_rows.is_empty() {
            return Err(ReportServiceError::NoRecords);
        }

        let class_section = student_rows[0].class_section.clone();
        let months = MONTHS
            .iter()
            .map(|&month| {
                let monthly_fee: i64 = student_rows
                    .iter()
                    .filter(|r| r.month == month)
                    .map(|r| r.monthly_fee)
                    .sum();
                let received_amount: i64 = student_rows
                    .iter()
                    .filter(|r| r.month == month)
                    .map(|r| r.received_amount)
                    .sum();
                YearlyMonthRow {
                    month: month.to_string(),
                    monthly_fee,
                    received_amount,
                    paid: monthly_fee > 0,
                }
            })
            .collect();

        Ok(YearlyReport {
            student_name: student_name.to_string(),
            class_category: class_category.to_string(),
            class_section,
            total_monthly_fee: student_rows.iter().map(|r| r.monthly_fee).sum(),
            total_annual_charges: student_rows.iter().map(|r| r.annual_charges).sum(),
            total_admission_fee: student_rows.iter().map(|r| r.admission_fee).sum(),
            total_received: student_rows.iter().map(|r| r.received_amount).sum(),
            months,
        })
    }

    async fn ledger_or_empty(&self, school: &str) -> Vec<PaymentRecord> {
        match self.payments.load_all(school).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("ledger read failed, reporting on empty data: {e}");
                Vec::new()
            }
        }
    }

    async fn profiles_by_student(&self, school: &str) -> HashMap<String, FeeProfile> {
        match self.fee_profiles.list(school).await {
            Ok(profiles) => profiles
                .into_iter()
                .map(|p| (p.student_id.clone(), p))
                .collect(),
            Err(e) => {
                tracing::warn!("fee profiles unavailable for reporting: {e}");
                HashMap::new()
            }
        }
    }
}

fn known_students(records: &[PaymentRecord]) -> Vec<KnownStudent> {
    let mut seen = HashSet::new();
    let mut students = Vec::new();
    for record in records {
        if seen.insert(record.student_id.as_str()) {
            students.push(KnownStudent {
                student_id: record.student_id.clone(),
                student_name: record.student_name.clone(),
                class_category: record.class_category.clone(),
            });
        }
    }
    students
}

/// Profile amount when set, else the student's latest positive monthly fee,
/// else the school default.
fn estimated_monthly_fee(
    records: &[PaymentRecord],
    profiles: &HashMap<String, FeeProfile>,
    student_id: &str,
) -> i64 {
    if let Some(profile) = profiles.get(student_id) {
        return profile.monthly_fee;
    }
    records
        .iter()
        .rev()
        .find(|r| r.student_id == student_id && r.monthly_fee > 0)
        .map(|r| r.monthly_fee)
        .unwrap_or(DEFAULT_MONTHLY_FEE)
}
