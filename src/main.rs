use feedesk::{
    config::session::SessionConfig,
    db, handlers,
    middleware::session_auth::{require_admin, require_auth},
    repositories::{SqliteFeeProfileRepository, SqlitePaymentRepository, SqliteUserRepository},
    services::{
        auth_service::AuthService, fee_service::FeeService, ledger_service::LedgerService,
        report_service::ReportService, user_service::UserService,
    },
    AppState,
};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;
    let session_layer = SessionConfig::from_env().create_layer(session_store);

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let payment_repository = Arc::new(SqlitePaymentRepository::new(pool.clone()));
    let fee_profile_repository = Arc::new(SqliteFeeProfileRepository::new(pool.clone()));

    let app_state = AppState {
        auth_service: Arc::new(AuthService::new(user_repository.clone())),
        user_service: Arc::new(UserService::new(user_repository)),
        fee_service: Arc::new(FeeService::new(fee_profile_repository.clone())),
        ledger_service: Arc::new(LedgerService::new(payment_repository.clone())),
        report_service: Arc::new(ReportService::new(
            payment_repository,
            fee_profile_repository,
        )),
        pool: pool.clone(),
    };

    let public_routes = Router::new()
        .route("/api/signup", post(handlers::auth_handlers::signup))
        .route("/api/login", post(handlers::auth_handlers::login));

    let authed_routes = Router::new()
        .route("/api/logout", post(handlers::auth_handlers::logout))
        .route("/api/session", get(handlers::auth_handlers::session_info))
        .route(
            "/api/payments",
            post(handlers::payment_handlers::record_payment),
        )
        .route(
            "/api/students/status",
            get(handlers::payment_handlers::student_status),
        )
        .route(
            "/api/students/{student_id}/unpaid-months",
            get(handlers::payment_handlers::unpaid_months),
        )
        .route_layer(middleware::from_fn(require_auth));

    let admin_routes = Router::new()
        .route(
            "/api/records",
            get(handlers::payment_handlers::list_records),
        )
        .route(
            "/api/records/{id}",
            axum::routing::put(handlers::payment_handlers::update_record)
                .delete(handlers::payment_handlers::delete_record),
        )
        .route(
            "/api/fees",
            get(handlers::fee_handlers::list_fees).post(handlers::fee_handlers::set_fees),
        )
        .route(
            "/api/fees/{student_id}",
            axum::routing::put(handlers::fee_handlers::update_fees)
                .delete(handlers::fee_handlers::delete_fees),
        )
        .route(
            "/api/fees/{student_id}/effective",
            get(handlers::fee_handlers::effective_fees),
        )
        .route(
            "/api/users",
            get(handlers::user_handlers::list_users).post(handlers::user_handlers::create_user),
        )
        .route(
            "/api/users/{username}",
            axum::routing::delete(handlers::user_handlers::delete_user),
        )
        .route(
            "/api/users/{username}/password",
            post(handlers::user_handlers::reset_password),
        )
        .route(
            "/api/reports/months/{month}",
            get(handlers::report_handlers::month_status),
        )
        .route(
            "/api/reports/outstanding",
            get(handlers::report_handlers::overall_status),
        )
        .route(
            "/api/reports/classes/{class_category}",
            get(handlers::report_handlers::class_summary),
        )
        .route(
            "/api/reports/yearly",
            get(handlers::report_handlers::yearly_report),
        )
        .route_layer(middleware::from_fn(require_admin));

    let app = Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .merge(admin_routes)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
