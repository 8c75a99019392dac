use crate::calendar::{self, ADMISSION, ANNUAL, DATE_FORMAT, MONTHS};
use crate::identity::derive_student_id;
use crate::models::payment::{NewPaymentRecord, PaymentRecord, UpdatePaymentRecord};
use crate::repositories::{PaymentRepository, RepositoryError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum LedgerServiceError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Unknown month: {0}")]
    UnknownMonth(String),
    #[error("Please select a month for Monthly Fee payment")]
    NoMonthSelected,
    #[error("{0} has already been paid for this student")]
    MonthAlreadyPaid(String),
    #[error("Annual charges have already been paid for this academic year")]
    AnnualAlreadyPaid,
    #[error("Admission fee has already been paid for this academic year")]
    AdmissionAlreadyPaid,
    #[error("Record not found")]
    RecordNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    Monthly,
    Annual,
    Admission,
}

/// A payment as entered on the fee form. `months` applies to monthly
/// payments only; annual and admission payments produce a single sentinel
/// row for the payment date's academic year.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSubmission {
    pub student_name: String,
    pub class_category: String,
    pub class_section: String,
    pub fee_kind: FeeKind,
    pub months: Vec<String>,
    pub amount: i64,
    pub received_amount: i64,
    pub payment_method: String,
    pub payment_date: NaiveDate,
    pub signature: String,
}

/// A record edit from the admin ledger view. The entry timestamp is
/// refreshed by the service; the student identifier is never recomputed.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordEdit {
    pub student_name: String,
    pub class_category: String,
    pub class_section: String,
    pub month: String,
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
    pub received_amount: i64,
    pub payment_method: String,
    pub payment_date: String,
    pub signature: String,
    pub academic_year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentHistory {
    pub student_id: String,
    pub records: Vec<PaymentRecord>,
    pub total_monthly: i64,
    pub total_annual: i64,
    pub total_admission: i64,
    pub total_received: i64,
}

pub struct LedgerService {
    payments: Arc<dyn PaymentRepository>,
}

impl LedgerService {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    /// Record a payment after running the duplicate pre-checks.
    ///
    /// Monthly payments insert one row per selected month, each carrying the
    /// fee as the received amount. Annual and admission payments insert a
    /// single sentinel row and are rejected when the academic year already
    /// has one with a positive amount. The check is best-effort: it reads
    /// the ledger immediately before appending, nothing at the storage
    /// layer re-validates.
    pub async fn record_payment(
        &self,
        school: &str,
        submission: PaymentSubmission,
    ) -> Result<Vec<PaymentRecord>, LedgerServiceError> {
        if submission.student_name.trim().is_empty()
            || submission.class_category.trim().is_empty()
            || submission.signature.trim().is_empty()
        {
            return Err(LedgerServiceError::MissingFields);
        }

        let student_id = derive_student_id(&submission.student_name, &submission.class_category);
        let academic_year = calendar::academic_year_for(submission.payment_date);
        let payment_date = submission.payment_date.format(DATE_FORMAT).to_string();
        let entry_timestamp = calendar::now_stamp();

        let base = NewPaymentRecord {
            student_id: student_id.clone(),
            student_name: submission.student_name.clone(),
            class_category: submission.class_category.clone(),
            class_section: submission.class_section.clone(),
            month: String::new(),
            monthly_fee: 0,
            annual_charges: 0,
            admission_fee: 0,
            received_amount: 0,
            payment_method: submission.payment_method.clone(),
            payment_date,
            signature: submission.signature.clone(),
            entry_timestamp,
            academic_year: academic_year.clone(),
        };

        let records = match submission.fee_kind {
            FeeKind::Monthly => {
                if submission.months.is_empty() {
                    return Err(LedgerServiceError::NoMonthSelected);
                }
                for month in &submission.months {
                    if !calendar::is_month_name(month) {
                        return Err(LedgerServiceError::UnknownMonth(month.clone()));
                    }
                }

                let unpaid = self.unpaid_months(school, &student_id).await?;
                for month in &submission.months {
                    if !unpaid.contains(month) {
                        return Err(LedgerServiceError::MonthAlreadyPaid(month.clone()));
                    }
                }

                submission
                    .months
                    .iter()
                    .map(|month| NewPaymentRecord {
                        month: month.clone(),
                        monthly_fee: submission.amount,
                        received_amount: submission.amount,
                        ..base.clone()
                    })
                    .collect()
            }
            FeeKind::Annual => {
                let (annual_paid, _) = self
                    .annual_admission_paid(school, &student_id, &academic_year)
                    .await?;
                if annual_paid {
                    return Err(LedgerServiceError::AnnualAlreadyPaid);
                }

                vec![NewPaymentRecord {
                    month: ANNUAL.to_string(),
                    annual_charges: submission.amount,
                    received_amount: submission.received_amount,
                    ..base
                }]
            }
            FeeKind::Admission => {
                let (_, admission_paid) = self
                    .annual_admission_paid(school, &student_id, &academic_year)
                    .await?;
                if admission_paid {
                    return Err(LedgerServiceError::AdmissionAlreadyPaid);
                }

                vec![NewPaymentRecord {
                    month: ADMISSION.to_string(),
                    admission_fee: submission.amount,
                    received_amount: submission.received_amount,
                    ..base
                }]
            }
        };

        Ok(self.payments.append(school, records).await?)
    }

    /// The months still unpaid for a student, in academic order.
    ///
    /// A month counts as paid once any row for the student carries a
    /// positive monthly fee under that month's name. A student with no
    /// ledger rows owes all twelve; so does one whose ledger cannot be read,
    /// since read failures degrade to an empty ledger.
    pub async fn unpaid_months(
        &self,
        school: &str,
        student_id: &str,
    ) -> Result<Vec<String>, LedgerServiceError> {
        let records = self.student_records_or_empty(school, student_id).await;

        let paid: HashSet<&str> = records
            .iter()
            .filter(|r| r.monthly_fee > 0)
            .map(|r| r.month.as_str())
            .collect();

        Ok(MONTHS
            .iter()
            .filter(|m| !paid.contains(**m))
            .map(|m| (*m).to_string())
            .collect())
    }

    /// Whether annual charges and the admission fee have been paid for the
    /// academic year: positive column sums over the student's rows for that
    /// year.
    pub async fn annual_admission_paid(
        &self,
        school: &str,
        student_id: &str,
        academic_year: &str,
    ) -> Result<(bool, bool), LedgerServiceError> {
        let records = self.student_records_or_empty(school, student_id).await;

        let (mut annual_total, mut admission_total) = (0i64, 0i64);
        for record in records.iter().filter(|r| r.academic_year == academic_year) {
            annual_total += record.annual_charges;
            admission_total += record.admission_fee;
        }

        Ok((annual_total > 0, admission_total > 0))
    }

    pub async fn student_history(
        &self,
        school: &str,
        student_id: &str,
    ) -> Result<StudentHistory, LedgerServiceError> {
        let records = self.student_records_or_empty(school, student_id).await;

        let total_monthly = records.iter().map(|r| r.monthly_fee).sum();
        let total_annual = records.iter().map(|r| r.annual_charges).sum();
        let total_admission = records.iter().map(|r| r.admission_fee).sum();
        let total_received = records.iter().map(|r| r.received_amount).sum();

        Ok(StudentHistory {
            student_id: student_id.to_string(),
            records,
            total_monthly,
            total_annual,
            total_admission,
            total_received,
        })
    }

    pub async fn list_records(
        &self,
        school: &str,
    ) -> Result<Vec<PaymentRecord>, LedgerServiceError> {
        Ok(self.payments.load_all(school).await?)
    }

    pub async fn update_record(
        &self,
        school: &str,
        id: i64,
        edit: RecordEdit,
    ) -> Result<PaymentRecord, LedgerServiceError> {
        if !calendar::is_ledger_month_label(&edit.month) {
            return Err(LedgerServiceError::UnknownMonth(edit.month));
        }

        let update = UpdatePaymentRecord {
            student_name: edit.student_name,
            class_category: edit.class_category,
            class_section: edit.class_section,
            month: edit.month,
            monthly_fee: edit.monthly_fee,
            annual_charges: edit.annual_charges,
            admission_fee: edit.admission_fee,
            received_amount: edit.received_amount,
            payment_method: edit.payment_method,
            payment_date: edit.payment_date,
            signature: edit.signature,
            entry_timestamp: calendar::now_stamp(),
            academic_year: edit.academic_year,
        };

        match self.payments.update_record(school, id, update).await {
            Ok(()) => self
                .payments
                .find_by_id(school, id)
                .await?
                .ok_or(LedgerServiceError::RecordNotFound),
            Err(RepositoryError::NotFound) => Err(LedgerServiceError::RecordNotFound),
            Err(e) => Err(LedgerServiceError::Repository(e)),
        }
    }

    pub async fn delete_record(&self, school: &str, id: i64) -> Result<(), LedgerServiceError> {
        match self.payments.delete_record(school, id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(LedgerServiceError::RecordNotFound),
            Err(e) => Err(LedgerServiceError::Repository(e)),
        }
    }

    async fn student_records_or_empty(&self, school: &str, student_id: &str) -> Vec<PaymentRecord> {
        match self.payments.find_by_student(school, student_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("ledger read failed, treating as empty: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::payment_repository::MockPaymentRepository;

    fn row(student_id: &str, month: &str, monthly_fee: i64) -> PaymentRecord {
        PaymentRecord {
            id: 1,
            school: "greenvalley".to_string(),
            student_id: student_id.to_string(),
            student_name: "Ali Khan".to_string(),
            class_category: "Class 3".to_string(),
            class_section: String::new(),
            month: month.to_string(),
            monthly_fee,
            annual_charges: 0,
            admission_fee: 0,
            received_amount: monthly_fee,
            payment_method: "Cash".to_string(),
            payment_date: "2026-04-01".to_string(),
            signature: "clerk".to_string(),
            entry_timestamp: "2026-04-01 09:00:00".to_string(),
            academic_year: "2026-2027".to_string(),
        }
    }

    #[tokio::test]
    async fn all_twelve_months_unpaid_without_rows() {
        let mut mock_repo = MockPaymentRepository::new();
        mock_repo
            .expect_find_by_student()
            .returning(|_, _| Box::pin(async move { Ok(Vec::new()) }));

        let service = LedgerService::new(Arc::new(mock_repo));
        let unpaid = service.unpaid_months("greenvalley", "ABCD1234").await.unwrap();
        assert_eq!(unpaid, MONTHS.map(String::from).to_vec());
    }

    #[tokio::test]
    async fn zero_fee_rows_do_not_mark_a_month_paid() {
        let mut mock_repo = MockPaymentRepository::new();
        mock_repo.expect_find_by_student().returning(|_, _| {
            Box::pin(async move { Ok(vec![row("ABCD1234", "APRIL", 0), row("ABCD1234", "MAY", 2000)]) })
        });

        let service = LedgerService::new(Arc::new(mock_repo));
        let unpaid = service.unpaid_months("greenvalley", "ABCD1234").await.unwrap();
        assert!(unpaid.contains(&"APRIL".to_string()));
        assert!(!unpaid.contains(&"MAY".to_string()));
    }

    #[tokio::test]
    async fn read_failure_degrades_to_all_unpaid() {
        let mut mock_repo = MockPaymentRepository::new();
        mock_repo.expect_find_by_student().returning(|_, _| {
            Box::pin(async move { Err(RepositoryError::Database(sqlx::Error::PoolClosed)) })
        });

        let service = LedgerService::new(Arc::new(mock_repo));
        let unpaid = service.unpaid_months("greenvalley", "ABCD1234").await.unwrap();
        assert_eq!(unpaid.len(), 12);
    }
}
