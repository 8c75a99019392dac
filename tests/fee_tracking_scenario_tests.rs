//! Full walkthrough: a school owner signs up, logs in, records payments for
//! a student, and runs into the duplicate-annual guard.

use chrono::NaiveDate;
use feedesk::{
    identity::derive_student_id,
    models::user::Role,
    repositories::{SqlitePaymentRepository, SqliteUserRepository},
    school::school_slug,
    services::auth_service::{AuthService, LoginRequest},
    services::ledger_service::{FeeKind, LedgerService, LedgerServiceError, PaymentSubmission},
    services::user_service::{SignupRequest, UserService},
    test_utils::test_helpers,
};
use std::sync::Arc;

#[tokio::test]
async fn admin_signup_login_and_fee_entry_walkthrough() {
    let pool = test_helpers::create_test_db().await.unwrap();

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository.clone());
    let auth_service = AuthService::new(user_repository);
    let ledger_service = LedgerService::new(Arc::new(SqlitePaymentRepository::new(pool)));

    // Admin owner signs up for "Green Valley"
    let owner = user_service
        .signup(SignupRequest {
            username: "admin1".to_string(),
            password: "password123".to_string(),
            password_confirm: Some("password123".to_string()),
            email: "admin1@gmail.com".to_string(),
            school_name: Some("Green Valley".to_string()),
            admin_owner: true,
        })
        .await
        .unwrap();
    assert_eq!(owner.role, Role::AdminOwner);

    // Logging in right away works and shows roughly 30 days of trial
    let session = auth_service
        .authenticate(LoginRequest {
            username: "admin1".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.school_name.as_deref(), Some("Green Valley"));
    assert!(session.trial_remaining_secs > 29 * 86_400);
    assert!(session.trial_remaining_secs <= 30 * 86_400);

    let school = school_slug(session.school_name.as_deref().unwrap());
    assert_eq!(school, "greenvalley");

    // April's fee for Ali Khan goes in
    let records = ledger_service
        .record_payment(
            &school,
            PaymentSubmission {
                student_name: "Ali Khan".to_string(),
                class_category: "Class 3".to_string(),
                class_section: String::new(),
                fee_kind: FeeKind::Monthly,
                months: vec!["APRIL".to_string()],
                amount: 2000,
                received_amount: 2000,
                payment_method: "Cash".to_string(),
                payment_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
                signature: "admin1".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 1);

    let student_id = derive_student_id("Ali Khan", "Class 3");
    let unpaid = ledger_service
        .unpaid_months(&school, &student_id)
        .await
        .unwrap();
    assert!(!unpaid.contains(&"APRIL".to_string()));
    assert_eq!(unpaid.len(), 11);

    // Annual charges once: fine
    let annual = PaymentSubmission {
        student_name: "Ali Khan".to_string(),
        class_category: "Class 3".to_string(),
        class_section: String::new(),
        fee_kind: FeeKind::Annual,
        months: Vec::new(),
        amount: 5000,
        received_amount: 5000,
        payment_method: "Cash".to_string(),
        payment_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
        signature: "admin1".to_string(),
    };
    ledger_service
        .record_payment(&school, annual.clone())
        .await
        .unwrap();

    // Annual charges twice in the same academic year: rejected
    let result = ledger_service.record_payment(&school, annual).await;
    assert!(matches!(result, Err(LedgerServiceError::AnnualAlreadyPaid)));
}
