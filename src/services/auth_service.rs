use crate::calendar;
use crate::models::user::Role;
use crate::repositories::{RepositoryError, UserRepository};
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Your free trial has expired. Please contact support.")]
    TrialExpired,
    #[error("Stored trial window is malformed")]
    MalformedTrialWindow,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The outcome of a successful authentication: who the caller is, which
/// school scope they operate in, and how much trial time is left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub username: String,
    pub role: Role,
    pub school_name: Option<String>,
    pub trial_remaining_secs: i64,
}

impl AuthSession {
    pub fn format_trial_remaining(&self) -> String {
        calendar::format_remaining(self.trial_remaining_secs)
    }
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn authenticate(
        &self,
        request: LoginRequest,
    ) -> Result<AuthSession, AuthServiceError> {
        self.authenticate_at(request, Utc::now().naive_utc()).await
    }

    /// Deterministic entry point: authenticate as of `now`.
    ///
    /// The trial is evaluated here and nowhere else. A correct password on
    /// an expired trial does not establish a session: expiry means `now` is
    /// strictly past the stored trial end, so logging in at the exact end
    /// instant still succeeds.
    pub async fn authenticate_at(
        &self,
        request: LoginRequest,
        now: NaiveDateTime,
    ) -> Result<AuthSession, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !self.verify_password(&request.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let trial_end = calendar::parse_timestamp(&user.trial_end)
            .ok_or(AuthServiceError::MalformedTrialWindow)?;

        if now > trial_end {
            return Err(AuthServiceError::TrialExpired);
        }

        Ok(AuthSession {
            username: user.username,
            role: user.role,
            school_name: user.school_name,
            trial_remaining_secs: (trial_end - now).num_seconds(),
        })
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    #[tokio::test]
    async fn unknown_username_is_invalid_credentials() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_username()
            .with(eq("ghost"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = AuthService::new(Arc::new(mock_repo));

        let request = LoginRequest {
            username: "ghost".to_string(),
            password: "whatever123".to_string(),
        };

        let result = service.authenticate(request).await;
        assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn garbage_hash_is_invalid_credentials() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo.expect_find_by_username().times(1).returning(|_| {
            Box::pin(async move {
                Ok(Some(crate::models::user::User {
                    id: 1,
                    username: "teacher1".to_string(),
                    password_hash: "not-a-phc-string".to_string(),
                    email: "teacher1@gmail.com".to_string(),
                    school_name: None,
                    role: Role::User,
                    created_at: "2026-01-01 00:00:00".to_string(),
                    trial_start: "2026-01-01 00:00:00".to_string(),
                    trial_end: "2099-01-01 00:00:00".to_string(),
                    created_by: "system".to_string(),
                }))
            })
        });

        let service = AuthService::new(Arc::new(mock_repo));

        let request = LoginRequest {
            username: "teacher1".to_string(),
            password: "password123".to_string(),
        };

        let result = service.authenticate(request).await;
        assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    }
}
