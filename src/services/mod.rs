pub mod auth_service;
pub mod fee_service;
pub mod ledger_service;
pub mod report_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, AuthSession, LoginRequest};
pub use fee_service::{FeeService, FeeServiceError, SetFeesRequest};
pub use ledger_service::{
    FeeKind, LedgerService, LedgerServiceError, PaymentSubmission, RecordEdit, StudentHistory,
};
pub use report_service::{
    ClassSummary, MonthStatusReport, ReportService, ReportServiceError, StudentOutstanding,
    YearlyReport,
};
pub use user_service::{CreateUserRequest, SignupRequest, UserService, UserServiceError};
