use crate::calendar;
use crate::identity::derive_student_id;
use crate::models::fee_profile::{EffectiveFees, FeeProfile};
use crate::repositories::{FeeProfileRepository, RepositoryError};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FeeServiceError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Fee profile not found")]
    ProfileNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetFeesRequest {
    pub student_name: String,
    pub class_category: String,
    pub monthly_fee: i64,
    pub annual_charges: i64,
    pub admission_fee: i64,
}

pub struct FeeService {
    repository: Arc<dyn FeeProfileRepository>,
}

impl FeeService {
    pub fn new(repository: Arc<dyn FeeProfileRepository>) -> Self {
        Self { repository }
    }

    /// Create or overwrite the fee profile keyed by the derived student id.
    pub async fn set_fees(
        &self,
        school: &str,
        request: SetFeesRequest,
    ) -> Result<FeeProfile, FeeServiceError> {
        if request.student_name.trim().is_empty() || request.class_category.trim().is_empty() {
            return Err(FeeServiceError::MissingFields);
        }

        let student_id = derive_student_id(&request.student_name, &request.class_category);
        let profile = FeeProfile {
            school: school.to_string(),
            student_id,
            student_name: request.student_name,
            class_category: request.class_category,
            monthly_fee: request.monthly_fee,
            annual_charges: request.annual_charges,
            admission_fee: request.admission_fee,
            updated_at: calendar::now_stamp(),
        };

        Ok(self.repository.upsert(profile).await?)
    }

    /// Edit an existing profile. A changed name or class re-derives the
    /// student id, so the profile migrates to the new key and the old key is
    /// removed.
    pub async fn update_fees(
        &self,
        school: &str,
        student_id: &str,
        request: SetFeesRequest,
    ) -> Result<FeeProfile, FeeServiceError> {
        self.repository
            .get(school, student_id)
            .await?
            .ok_or(FeeServiceError::ProfileNotFound)?;

        if request.student_name.trim().is_empty() || request.class_category.trim().is_empty() {
            return Err(FeeServiceError::MissingFields);
        }

        let new_id = derive_student_id(&request.student_name, &request.class_category);
        if new_id != student_id {
            self.repository.delete(school, student_id).await?;
        }

        let profile = FeeProfile {
            school: school.to_string(),
            student_id: new_id,
            student_name: request.student_name,
            class_category: request.class_category,
            monthly_fee: request.monthly_fee,
            annual_charges: request.annual_charges,
            admission_fee: request.admission_fee,
            updated_at: calendar::now_stamp(),
        };

        Ok(self.repository.upsert(profile).await?)
    }

    pub async fn delete_fees(&self, school: &str, student_id: &str) -> Result<(), FeeServiceError> {
        match self.repository.delete(school, student_id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(FeeServiceError::ProfileNotFound),
            Err(e) => Err(FeeServiceError::Repository(e)),
        }
    }

    pub async fn list_fees(&self, school: &str) -> Result<Vec<FeeProfile>, FeeServiceError> {
        Ok(self.repository.list(school).await?)
    }

    pub async fn get_profile(
        &self,
        school: &str,
        student_id: &str,
    ) -> Result<Option<FeeProfile>, FeeServiceError> {
        Ok(self.repository.get(school, student_id).await?)
    }

    /// The amounts the payment form should be pre-filled with: the profile
    /// when one exists, otherwise the school-wide defaults.
    pub async fn effective_fees(
        &self,
        school: &str,
        student_id: &str,
    ) -> Result<EffectiveFees, FeeServiceError> {
        let fees = self
            .repository
            .get(school, student_id)
            .await?
            .as_ref()
            .map(EffectiveFees::from)
            .unwrap_or_default();

        Ok(fees)
    }
}
