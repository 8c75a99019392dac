use crate::calendar::{self, TIMESTAMP_FORMAT};
use crate::models::user::{Role, User};
use crate::repositories::{NewUser, RepositoryError, UserRepository};
use crate::services::auth_service::AuthSession;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Accounts sign up with the Gmail address they use to reach the app.
static GMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@gmail\.com$").expect("gmail pattern compiles"));

const TRIAL_DAYS: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Username, password, and Gmail address are required")]
    MissingFields,
    #[error("Please use a valid Gmail address (e.g., username@gmail.com)")]
    InvalidEmail,
    #[error("This Gmail address is already registered. Please use a different Gmail address or log in.")]
    EmailTaken,
    #[error("This username is already taken")]
    UsernameTaken,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("School name is required for Admin Owner registration")]
    SchoolNameRequired,
    #[error("Admin Owner accounts cannot be deleted")]
    ProtectedAccount,
    #[error("You cannot delete your own account")]
    CannotDeleteSelf,
    #[error("Only the account owner or its creator may manage this account")]
    NotPermitted,
    #[error("User not found")]
    UserNotFound,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Self-service signup. `admin_owner` registers the account as the owner of
/// `school_name`; otherwise a plain user with no school attachment yet.
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: Option<String>,
    pub email: String,
    pub school_name: Option<String>,
    pub admin_owner: bool,
}

/// An admin creating an account under their own school. The new account
/// inherits the creator's school and records the creator.
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: Option<String>,
    pub email: String,
    pub sub_admin: bool,
}

/// One row of the user-management listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub role_label: String,
    pub school_name: Option<String>,
    pub created_at: String,
    pub trial_remaining: String,
    pub created_by: String,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<User, UserServiceError> {
        let role = if request.admin_owner {
            Role::AdminOwner
        } else {
            Role::User
        };
        let school_name = if request.admin_owner {
            match request.school_name.as_deref() {
                Some(name) if !name.trim().is_empty() => Some(name.to_string()),
                _ => return Err(UserServiceError::SchoolNameRequired),
            }
        } else {
            None
        };

        self.insert_user(
            &request.username,
            &request.password,
            request.password_confirm.as_deref(),
            &request.email,
            school_name,
            role,
            "system",
        )
        .await
    }

    pub async fn create_user(
        &self,
        actor: &AuthSession,
        request: CreateUserRequest,
    ) -> Result<User, UserServiceError> {
        let role = if request.sub_admin {
            Role::SubAdmin
        } else {
            Role::User
        };

        self.insert_user(
            &request.username,
            &request.password,
            request.password_confirm.as_deref(),
            &request.email,
            actor.school_name.clone(),
            role,
            &actor.username,
        )
        .await
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_username(username).await?)
    }

    /// Accounts created by `actor`, plus the actor itself, with the trial
    /// countdown rendered the way the management table shows it.
    pub async fn list_users(
        &self,
        actor: &AuthSession,
    ) -> Result<Vec<UserSummary>, UserServiceError> {
        let users = self.repository.list_visible_to(&actor.username).await?;
        Ok(users.iter().map(|u| self.summarize(u)).collect())
    }

    /// Operator listing across every account; used by the admin CLI only.
    pub async fn list_all_users(&self) -> Result<Vec<UserSummary>, UserServiceError> {
        let users = self.repository.list_all().await?;
        Ok(users.iter().map(|u| self.summarize(u)).collect())
    }

    pub async fn delete_user(
        &self,
        actor: &AuthSession,
        username: &str,
    ) -> Result<(), UserServiceError> {
        let target = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        if target.role == Role::AdminOwner {
            return Err(UserServiceError::ProtectedAccount);
        }
        if target.username == actor.username {
            return Err(UserServiceError::CannotDeleteSelf);
        }
        if target.created_by != actor.username {
            return Err(UserServiceError::NotPermitted);
        }

        match self.repository.delete_user(username).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::Repository(e)),
        }
    }

    pub async fn reset_password(
        &self,
        actor: &AuthSession,
        username: &str,
        new_password: &str,
        new_password_confirm: Option<&str>,
    ) -> Result<(), UserServiceError> {
        let target = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        if target.username != actor.username && target.created_by != actor.username {
            return Err(UserServiceError::NotPermitted);
        }
        // An owner's password can only be reset by the owner themselves.
        if target.role == Role::AdminOwner && target.username != actor.username {
            return Err(UserServiceError::NotPermitted);
        }

        if new_password.is_empty() {
            return Err(UserServiceError::MissingFields);
        }
        if let Some(confirm) = new_password_confirm {
            if new_password != confirm {
                return Err(UserServiceError::PasswordMismatch);
            }
        }

        let password_hash = self.hash_password(new_password)?;

        match self
            .repository
            .update_password(username, &password_hash)
            .await
        {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::Repository(e)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_user(
        &self,
        username: &str,
        password: &str,
        password_confirm: Option<&str>,
        email: &str,
        school_name: Option<String>,
        role: Role,
        created_by: &str,
    ) -> Result<User, UserServiceError> {
        if username.trim().is_empty() || password.is_empty() || email.is_empty() {
            return Err(UserServiceError::MissingFields);
        }
        if let Some(confirm) = password_confirm {
            if password != confirm {
                return Err(UserServiceError::PasswordMismatch);
            }
        }
        if !GMAIL_PATTERN.is_match(email) {
            return Err(UserServiceError::InvalidEmail);
        }
        if self.repository.email_exists(email).await? {
            return Err(UserServiceError::EmailTaken);
        }

        let password_hash = self.hash_password(password)?;

        let now = Utc::now().naive_utc();
        let trial_end = now + Duration::days(TRIAL_DAYS);

        let new_user = NewUser {
            username: username.to_string(),
            password_hash,
            email: email.to_string(),
            school_name,
            role,
            created_at: now.format(TIMESTAMP_FORMAT).to_string(),
            trial_start: now.format(TIMESTAMP_FORMAT).to_string(),
            trial_end: trial_end.format(TIMESTAMP_FORMAT).to_string(),
            created_by: created_by.to_string(),
        };

        match self.repository.create_user(new_user).await {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::UsernameTaken),
            Err(e) => Err(UserServiceError::Repository(e)),
        }
    }

    fn summarize(&self, user: &User) -> UserSummary {
        let trial_remaining = match calendar::parse_timestamp(&user.trial_end) {
            Some(trial_end) => {
                let remaining = trial_end - Utc::now().naive_utc();
                if remaining.num_seconds() > 0 {
                    calendar::format_remaining(remaining.num_seconds())
                } else {
                    "Expired".to_string()
                }
            }
            None => "N/A".to_string(),
        };

        UserSummary {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            role_label: user.role.label().to_string(),
            school_name: user.school_name.clone(),
            created_at: user.created_at.clone(),
            trial_remaining,
            created_by: user.created_by.clone(),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;

    #[tokio::test]
    async fn signup_rejects_non_gmail_address() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo));

        let request = SignupRequest {
            username: "admin1".to_string(),
            password: "password123".to_string(),
            password_confirm: None,
            email: "admin1@outlook.com".to_string(),
            school_name: Some("Green Valley".to_string()),
            admin_owner: true,
        };

        let result = service.signup(request).await;
        assert!(matches!(result, Err(UserServiceError::InvalidEmail)));
    }

    #[tokio::test]
    async fn admin_owner_signup_requires_school_name() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo));

        let request = SignupRequest {
            username: "admin1".to_string(),
            password: "password123".to_string(),
            password_confirm: None,
            email: "admin1@gmail.com".to_string(),
            school_name: Some("   ".to_string()),
            admin_owner: true,
        };

        let result = service.signup(request).await;
        assert!(matches!(result, Err(UserServiceError::SchoolNameRequired)));
    }

    #[tokio::test]
    async fn signup_rejects_password_mismatch() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo));

        let request = SignupRequest {
            username: "clerk1".to_string(),
            password: "password123".to_string(),
            password_confirm: Some("password124".to_string()),
            email: "clerk1@gmail.com".to_string(),
            school_name: None,
            admin_owner: false,
        };

        let result = service.signup(request).await;
        assert!(matches!(result, Err(UserServiceError::PasswordMismatch)));
    }
}
