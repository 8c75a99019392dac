use super::{RepositoryError, RepositoryResult};
use crate::models::user::{Role, User};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Everything needed to insert an account; the service layer is responsible
/// for hashing the password and stamping the trial window.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub school_name: Option<String>,
    pub role: Role,
    pub created_at: String,
    pub trial_start: String,
    pub trial_end: String,
    pub created_by: String,
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn email_exists(&self, email: &str) -> RepositoryResult<bool>;
    /// Accounts visible to `username`: those it created, plus itself.
    async fn list_visible_to(&self, username: &str) -> RepositoryResult<Vec<User>>;
    async fn list_all(&self) -> RepositoryResult<Vec<User>>;
    async fn update_password(&self, username: &str, password_hash: &str) -> RepositoryResult<()>;
    async fn delete_user(&self, username: &str) -> RepositoryResult<()>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, email, school_name, role, \
                            created_at, trial_start, trial_end, created_by";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users \
             (username, password_hash, email, school_name, role, created_at, trial_start, trial_end, created_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.school_name)
        .bind(user.role)
        .bind(&user.created_at)
        .bind(&user.trial_start)
        .bind(&user.trial_end)
        .bind(&user.created_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => self
                .find_by_username(&user.username)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => {
                if e.to_string().contains("UNIQUE") {
                    Err(RepositoryError::AlreadyExists)
                } else {
                    Err(RepositoryError::Database(e))
                }
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn list_visible_to(&self, username: &str) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE created_by = ? OR username = ? \
             ORDER BY created_at, id"
        ))
        .bind(username)
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_user(&self, username: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
