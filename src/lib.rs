pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod school;
pub mod services;

// Available to both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<services::auth_service::AuthService>,
    pub user_service: Arc<services::user_service::UserService>,
    pub fee_service: Arc<services::fee_service::FeeService>,
    pub ledger_service: Arc<services::ledger_service::LedgerService>,
    pub report_service: Arc<services::report_service::ReportService>,
    pub pool: sqlx::SqlitePool,
}
