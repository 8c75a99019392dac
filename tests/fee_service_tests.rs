use feedesk::{
    identity::derive_student_id,
    models::fee_profile::{DEFAULT_ADMISSION_FEE, DEFAULT_ANNUAL_CHARGES, DEFAULT_MONTHLY_FEE},
    repositories::SqliteFeeProfileRepository,
    services::fee_service::{FeeService, FeeServiceError, SetFeesRequest},
    test_utils::test_helpers,
};
use std::sync::Arc;

const SCHOOL: &str = "greenvalley";

fn service_for(pool: sqlx::SqlitePool) -> FeeService {
    FeeService::new(Arc::new(SqliteFeeProfileRepository::new(pool)))
}

fn fees_for(name: &str, class: &str) -> SetFeesRequest {
    SetFeesRequest {
        student_name: name.to_string(),
        class_category: class.to_string(),
        monthly_fee: 2500,
        annual_charges: 6000,
        admission_fee: 1500,
    }
}

#[tokio::test]
async fn profile_is_keyed_by_the_derived_id() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let profile = service
        .set_fees(SCHOOL, fees_for("Ali Khan", "Class 3"))
        .await
        .unwrap();

    assert_eq!(profile.student_id, derive_student_id("Ali Khan", "Class 3"));
    assert_eq!(profile.monthly_fee, 2500);

    let fetched = service
        .get_profile(SCHOOL, &profile.student_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.student_name, "Ali Khan");
}

#[tokio::test]
async fn setting_fees_twice_overwrites_the_profile() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    service
        .set_fees(SCHOOL, fees_for("Ali Khan", "Class 3"))
        .await
        .unwrap();

    let mut updated = fees_for("Ali Khan", "Class 3");
    updated.monthly_fee = 3000;
    let profile = service.set_fees(SCHOOL, updated).await.unwrap();

    assert_eq!(profile.monthly_fee, 3000);
    assert_eq!(service.list_fees(SCHOOL).await.unwrap().len(), 1);
}

#[tokio::test]
async fn renaming_a_student_migrates_the_profile_key() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let original = service
        .set_fees(SCHOOL, fees_for("Ali Khan", "Class 3"))
        .await
        .unwrap();

    let migrated = service
        .update_fees(SCHOOL, &original.student_id, fees_for("Ali Khan", "Class 4"))
        .await
        .unwrap();

    assert_ne!(migrated.student_id, original.student_id);
    assert_eq!(
        migrated.student_id,
        derive_student_id("Ali Khan", "Class 4")
    );

    // Old key is gone, new key resolves
    assert!(service
        .get_profile(SCHOOL, &original.student_id)
        .await
        .unwrap()
        .is_none());
    assert!(service
        .get_profile(SCHOOL, &migrated.student_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn editing_without_renaming_keeps_the_key() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let original = service
        .set_fees(SCHOOL, fees_for("Ali Khan", "Class 3"))
        .await
        .unwrap();

    let mut edit = fees_for("Ali Khan", "Class 3");
    edit.annual_charges = 7000;
    let updated = service
        .update_fees(SCHOOL, &original.student_id, edit)
        .await
        .unwrap();

    assert_eq!(updated.student_id, original.student_id);
    assert_eq!(updated.annual_charges, 7000);
    assert_eq!(service.list_fees(SCHOOL).await.unwrap().len(), 1);
}

#[tokio::test]
async fn updating_a_missing_profile_fails() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let result = service
        .update_fees(SCHOOL, "DEADBEEF", fees_for("Ali Khan", "Class 3"))
        .await;
    assert!(matches!(result, Err(FeeServiceError::ProfileNotFound)));
}

#[tokio::test]
async fn effective_fees_fall_back_to_the_defaults() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let fees = service.effective_fees(SCHOOL, "DEADBEEF").await.unwrap();
    assert_eq!(fees.monthly_fee, DEFAULT_MONTHLY_FEE);
    assert_eq!(fees.annual_charges, DEFAULT_ANNUAL_CHARGES);
    assert_eq!(fees.admission_fee, DEFAULT_ADMISSION_FEE);

    let profile = service
        .set_fees(SCHOOL, fees_for("Ali Khan", "Class 3"))
        .await
        .unwrap();
    let fees = service
        .effective_fees(SCHOOL, &profile.student_id)
        .await
        .unwrap();
    assert_eq!(fees.monthly_fee, 2500);
}

#[tokio::test]
async fn deleting_a_profile_removes_it() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let profile = service
        .set_fees(SCHOOL, fees_for("Ali Khan", "Class 3"))
        .await
        .unwrap();

    service.delete_fees(SCHOOL, &profile.student_id).await.unwrap();
    let result = service.delete_fees(SCHOOL, &profile.student_id).await;
    assert!(matches!(result, Err(FeeServiceError::ProfileNotFound)));
}
