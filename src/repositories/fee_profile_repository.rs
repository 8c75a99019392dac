use super::{RepositoryError, RepositoryResult};
use crate::models::fee_profile::FeeProfile;
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait FeeProfileRepository: Send + Sync {
    async fn upsert(&self, profile: FeeProfile) -> RepositoryResult<FeeProfile>;
    async fn get(&self, school: &str, student_id: &str) -> RepositoryResult<Option<FeeProfile>>;
    async fn list(&self, school: &str) -> RepositoryResult<Vec<FeeProfile>>;
    async fn delete(&self, school: &str, student_id: &str) -> RepositoryResult<()>;
}

pub struct SqliteFeeProfileRepository {
    pool: SqlitePool,
}

impl SqliteFeeProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str = "school, student_id, student_name, class_category, \
                               monthly_fee, annual_charges, admission_fee, updated_at";

#[async_trait]
impl FeeProfileRepository for SqliteFeeProfileRepository {
    async fn upsert(&self, profile: FeeProfile) -> RepositoryResult<FeeProfile> {
        sqlx::query(
            "INSERT INTO fee_profiles \
             (school, student_id, student_name, class_category, monthly_fee, annual_charges, \
              admission_fee, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(school, student_id) DO UPDATE SET \
             student_name = excluded.student_name, \
             class_category = excluded.class_category, \
             monthly_fee = excluded.monthly_fee, \
             annual_charges = excluded.annual_charges, \
             admission_fee = excluded.admission_fee, \
             updated_at = excluded.updated_at",
        )
        .bind(&profile.school)
        .bind(&profile.student_id)
        .bind(&profile.student_name)
        .bind(&profile.class_category)
        .bind(profile.monthly_fee)
        .bind(profile.annual_charges)
        .bind(profile.admission_fee)
        .bind(&profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn get(&self, school: &str, student_id: &str) -> RepositoryResult<Option<FeeProfile>> {
        let profile = sqlx::query_as::<_, FeeProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM fee_profiles WHERE school = ? AND student_id = ?"
        ))
        .bind(school)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn list(&self, school: &str) -> RepositoryResult<Vec<FeeProfile>> {
        let profiles = sqlx::query_as::<_, FeeProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM fee_profiles WHERE school = ? \
             ORDER BY class_category, student_name"
        ))
        .bind(school)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn delete(&self, school: &str, student_id: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM fee_profiles WHERE school = ? AND student_id = ?")
            .bind(school)
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
