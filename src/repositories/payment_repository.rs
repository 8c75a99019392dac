use super::{RepositoryError, RepositoryResult};
use crate::models::payment::{NewPaymentRecord, PaymentRecord, UpdatePaymentRecord};
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

/// The per-school payment ledger.
///
/// Rows are append-only from the payment form; the record-editing view goes
/// through `update_record` / `delete_record`. The one-annual/one-admission
/// invariant is a caller-side pre-check and is not enforced here.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PaymentRepository: Send + Sync {
    /// Append a batch of rows in one transaction.
    async fn append(
        &self,
        school: &str,
        records: Vec<NewPaymentRecord>,
    ) -> RepositoryResult<Vec<PaymentRecord>>;
    /// The school's full ledger. Rows that fail to decode are skipped, not
    /// fatal.
    async fn load_all(&self, school: &str) -> RepositoryResult<Vec<PaymentRecord>>;
    async fn find_by_student(
        &self,
        school: &str,
        student_id: &str,
    ) -> RepositoryResult<Vec<PaymentRecord>>;
    async fn find_by_id(&self, school: &str, id: i64) -> RepositoryResult<Option<PaymentRecord>>;
    async fn update_record(
        &self,
        school: &str,
        id: i64,
        update: UpdatePaymentRecord,
    ) -> RepositoryResult<()>;
    async fn delete_record(&self, school: &str, id: i64) -> RepositoryResult<()>;
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const PAYMENT_COLUMNS: &str =
    "id, school, student_id, student_name, class_category, class_section, month, \
     monthly_fee, annual_charges, admission_fee, received_amount, payment_method, \
     payment_date, signature, entry_timestamp, academic_year";

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn append(
        &self,
        school: &str,
        records: Vec<NewPaymentRecord>,
    ) -> RepositoryResult<Vec<PaymentRecord>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(records.len());

        for record in &records {
            let result = sqlx::query(
                "INSERT INTO payments \
                 (school, student_id, student_name, class_category, class_section, month, \
                  monthly_fee, annual_charges, admission_fee, received_amount, payment_method, \
                  payment_date, signature, entry_timestamp, academic_year) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(school)
            .bind(&record.student_id)
            .bind(&record.student_name)
            .bind(&record.class_category)
            .bind(&record.class_section)
            .bind(&record.month)
            .bind(record.monthly_fee)
            .bind(record.annual_charges)
            .bind(record.admission_fee)
            .bind(record.received_amount)
            .bind(&record.payment_method)
            .bind(&record.payment_date)
            .bind(&record.signature)
            .bind(&record.entry_timestamp)
            .bind(&record.academic_year)
            .execute(&mut *tx)
            .await?;

            ids.push(result.last_insert_rowid());
        }

        tx.commit().await?;

        let mut inserted = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.find_by_id(school, id).await? {
                inserted.push(record);
            }
        }

        Ok(inserted)
    }

    async fn load_all(&self, school: &str) -> RepositoryResult<Vec<PaymentRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE school = ? ORDER BY id"
        ))
        .bind(school)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .filter_map(|row| match PaymentRecord::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("skipping malformed ledger row: {e}");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    async fn find_by_student(
        &self,
        school: &str,
        student_id: &str,
    ) -> RepositoryResult<Vec<PaymentRecord>> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE school = ? AND student_id = ? ORDER BY id"
        ))
        .bind(school)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_by_id(&self, school: &str, id: i64) -> RepositoryResult<Option<PaymentRecord>> {
        let record = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE school = ? AND id = ?"
        ))
        .bind(school)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_record(
        &self,
        school: &str,
        id: i64,
        update: UpdatePaymentRecord,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE payments SET \
             student_name = ?, class_category = ?, class_section = ?, month = ?, \
             monthly_fee = ?, annual_charges = ?, admission_fee = ?, received_amount = ?, \
             payment_method = ?, payment_date = ?, signature = ?, entry_timestamp = ?, \
             academic_year = ? \
             WHERE school = ? AND id = ?",
        )
        .bind(&update.student_name)
        .bind(&update.class_category)
        .bind(&update.class_section)
        .bind(&update.month)
        .bind(update.monthly_fee)
        .bind(update.annual_charges)
        .bind(update.admission_fee)
        .bind(update.received_amount)
        .bind(&update.payment_method)
        .bind(&update.payment_date)
        .bind(&update.signature)
        .bind(&update.entry_timestamp)
        .bind(&update.academic_year)
        .bind(school)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_record(&self, school: &str, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE school = ? AND id = ?")
            .bind(school)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
