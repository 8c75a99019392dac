use feedesk::{
    models::user::{Role, User},
    repositories::SqliteUserRepository,
    services::auth_service::AuthSession,
    services::user_service::{CreateUserRequest, SignupRequest, UserService, UserServiceError},
    test_utils::test_helpers,
};
use std::sync::Arc;

fn service_for(pool: sqlx::SqlitePool) -> UserService {
    UserService::new(Arc::new(SqliteUserRepository::new(pool)))
}

fn session_for(user: &User) -> AuthSession {
    AuthSession {
        username: user.username.clone(),
        role: user.role,
        school_name: user.school_name.clone(),
        trial_remaining_secs: 0,
    }
}

fn owner_signup() -> SignupRequest {
    SignupRequest {
        username: "admin1".to_string(),
        password: "password123".to_string(),
        password_confirm: Some("password123".to_string()),
        email: "admin1@gmail.com".to_string(),
        school_name: Some("Green Valley".to_string()),
        admin_owner: true,
    }
}

#[tokio::test]
async fn admin_owner_signup_sets_role_school_and_trial() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let user = service.signup(owner_signup()).await.unwrap();

    assert_eq!(user.role, Role::AdminOwner);
    assert_eq!(user.school_name.as_deref(), Some("Green Valley"));
    assert_eq!(user.created_by, "system");
    assert!(user.trial_end > user.trial_start);
}

#[tokio::test]
async fn plain_signup_has_no_school() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let user = service
        .signup(SignupRequest {
            username: "clerk1".to_string(),
            password: "password123".to_string(),
            password_confirm: None,
            email: "clerk1@gmail.com".to_string(),
            // Ignored for non-owner signups
            school_name: Some("Somewhere".to_string()),
            admin_owner: false,
        })
        .await
        .unwrap();

    assert_eq!(user.role, Role::User);
    assert_eq!(user.school_name, None);
}

#[tokio::test]
async fn duplicate_email_is_rejected_across_accounts() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    service.signup(owner_signup()).await.unwrap();

    let result = service
        .signup(SignupRequest {
            username: "someone_else".to_string(),
            password: "password456".to_string(),
            password_confirm: None,
            email: "admin1@gmail.com".to_string(),
            school_name: None,
            admin_owner: false,
        })
        .await;

    assert!(matches!(result, Err(UserServiceError::EmailTaken)));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    service.signup(owner_signup()).await.unwrap();

    let mut request = owner_signup();
    request.email = "admin1.other@gmail.com".to_string();
    let result = service.signup(request).await;

    assert!(matches!(result, Err(UserServiceError::UsernameTaken)));
}

#[tokio::test]
async fn created_accounts_inherit_the_creators_school() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool);

    let owner = service.signup(owner_signup()).await.unwrap();
    let actor = session_for(&owner);

    let sub_admin = service
        .create_user(
            &actor,
            CreateUserRequest {
                username: "subadmin1".to_string(),
                password: "password123".to_string(),
                password_confirm: Some("password123".to_string()),
                email: "subadmin1@gmail.com".to_string(),
                sub_admin: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(sub_admin.role, Role::SubAdmin);
    assert_eq!(sub_admin.school_name.as_deref(), Some("Green Valley"));
    assert_eq!(sub_admin.created_by, "admin1");
}

#[tokio::test]
async fn admin_owner_account_cannot_be_deleted() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool.clone());

    let owner = service.signup(owner_signup()).await.unwrap();
    test_helpers::insert_test_user(
        &pool,
        "subadmin1",
        "subadmin1@gmail.com",
        "password123",
        Role::SubAdmin,
        Some("Green Valley"),
        "admin1",
    )
    .await
    .unwrap();

    let sub_admin = service.find_user("subadmin1").await.unwrap().unwrap();
    let result = service.delete_user(&session_for(&sub_admin), "admin1").await;
    assert!(matches!(result, Err(UserServiceError::ProtectedAccount)));

    // Not even by itself
    let result = service.delete_user(&session_for(&owner), "admin1").await;
    assert!(matches!(result, Err(UserServiceError::ProtectedAccount)));
}

#[tokio::test]
async fn accounts_cannot_delete_themselves() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool.clone());

    test_helpers::insert_test_user(
        &pool,
        "clerk1",
        "clerk1@gmail.com",
        "password123",
        Role::User,
        None,
        "admin1",
    )
    .await
    .unwrap();

    let clerk = service.find_user("clerk1").await.unwrap().unwrap();
    let result = service.delete_user(&session_for(&clerk), "clerk1").await;
    assert!(matches!(result, Err(UserServiceError::CannotDeleteSelf)));
}

#[tokio::test]
async fn only_the_creator_may_delete_an_account() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool.clone());

    let owner = service.signup(owner_signup()).await.unwrap();
    let actor = session_for(&owner);

    service
        .create_user(
            &actor,
            CreateUserRequest {
                username: "clerk1".to_string(),
                password: "password123".to_string(),
                password_confirm: None,
                email: "clerk1@gmail.com".to_string(),
                sub_admin: false,
            },
        )
        .await
        .unwrap();

    // An unrelated admin from another school cannot touch it
    test_helpers::insert_test_user(
        &pool,
        "admin2",
        "admin2@gmail.com",
        "password123",
        Role::AdminOwner,
        Some("Hill View"),
        "system",
    )
    .await
    .unwrap();
    let other = service.find_user("admin2").await.unwrap().unwrap();

    let result = service.delete_user(&session_for(&other), "clerk1").await;
    assert!(matches!(result, Err(UserServiceError::NotPermitted)));

    // The creator can
    service.delete_user(&actor, "clerk1").await.unwrap();
    assert!(service.find_user("clerk1").await.unwrap().is_none());
}

#[tokio::test]
async fn creator_resets_password_and_new_password_works() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool.clone());

    let owner = service.signup(owner_signup()).await.unwrap();
    let actor = session_for(&owner);

    service
        .create_user(
            &actor,
            CreateUserRequest {
                username: "clerk1".to_string(),
                password: "password123".to_string(),
                password_confirm: None,
                email: "clerk1@gmail.com".to_string(),
                sub_admin: false,
            },
        )
        .await
        .unwrap();

    service
        .reset_password(&actor, "clerk1", "newpassword456", Some("newpassword456"))
        .await
        .unwrap();

    let auth = feedesk::services::auth_service::AuthService::new(Arc::new(
        SqliteUserRepository::new(pool),
    ));
    let session = auth
        .authenticate(feedesk::services::auth_service::LoginRequest {
            username: "clerk1".to_string(),
            password: "newpassword456".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.username, "clerk1");
}

#[tokio::test]
async fn owner_password_reset_is_self_service_only() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool.clone());

    let owner = service.signup(owner_signup()).await.unwrap();

    test_helpers::insert_test_user(
        &pool,
        "subadmin1",
        "subadmin1@gmail.com",
        "password123",
        Role::SubAdmin,
        Some("Green Valley"),
        "admin1",
    )
    .await
    .unwrap();
    let sub_admin = service.find_user("subadmin1").await.unwrap().unwrap();

    let result = service
        .reset_password(
            &session_for(&sub_admin),
            "admin1",
            "hijacked123",
            Some("hijacked123"),
        )
        .await;
    assert!(matches!(result, Err(UserServiceError::NotPermitted)));

    service
        .reset_password(
            &session_for(&owner),
            "admin1",
            "ownerpass456",
            Some("ownerpass456"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn listing_shows_own_and_created_accounts_only() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service_for(pool.clone());

    let owner = service.signup(owner_signup()).await.unwrap();
    let actor = session_for(&owner);

    service
        .create_user(
            &actor,
            CreateUserRequest {
                username: "clerk1".to_string(),
                password: "password123".to_string(),
                password_confirm: None,
                email: "clerk1@gmail.com".to_string(),
                sub_admin: false,
            },
        )
        .await
        .unwrap();

    test_helpers::insert_test_user(
        &pool,
        "admin2",
        "admin2@gmail.com",
        "password123",
        Role::AdminOwner,
        Some("Hill View"),
        "system",
    )
    .await
    .unwrap();

    let listed = service.list_users(&actor).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|u| u.username.as_str()).collect();
    assert!(names.contains(&"admin1"));
    assert!(names.contains(&"clerk1"));
    assert!(!names.contains(&"admin2"));

    for user in &listed {
        assert_ne!(user.trial_remaining, "Expired");
    }
}
