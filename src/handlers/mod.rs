pub mod auth_handlers;
pub mod fee_handlers;
pub mod payment_handlers;
pub mod report_handlers;
pub mod user_handlers;
