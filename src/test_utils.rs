pub mod test_helpers {
    use crate::calendar::TIMESTAMP_FORMAT;
    use crate::models::user::Role;
    use chrono::{Duration, Utc};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert an account directly, with a hashed password and a fresh
    /// 30-day trial window.
    pub async fn insert_test_user(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
        school_name: Option<&str>,
        created_by: &str,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let now = Utc::now().naive_utc();
        let created_at = now.format(TIMESTAMP_FORMAT).to_string();
        let trial_end = (now + Duration::days(30)).format(TIMESTAMP_FORMAT).to_string();

        let result = sqlx::query(
            "INSERT INTO users \
             (username, password_hash, email, school_name, role, created_at, trial_start, trial_end, created_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(email)
        .bind(school_name)
        .bind(role)
        .bind(&created_at)
        .bind(&created_at)
        .bind(&trial_end)
        .bind(created_by)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite an account's trial end, for exercising expiry paths.
    pub async fn set_trial_end(
        pool: &SqlitePool,
        username: &str,
        trial_end: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET trial_end = ? WHERE username = ?")
            .bind(trial_end)
            .bind(username)
            .execute(pool)
            .await?;

        Ok(())
    }
}
