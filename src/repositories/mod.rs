pub mod fee_profile_repository;
pub mod payment_repository;
pub mod user_repository;

pub use fee_profile_repository::{FeeProfileRepository, SqliteFeeProfileRepository};
pub use payment_repository::{PaymentRepository, SqlitePaymentRepository};
pub use user_repository::{NewUser, SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
