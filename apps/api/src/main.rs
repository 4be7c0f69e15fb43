//! Congregate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use congregate_application::{
    AuthEventService, AuthorizationService, DirectoryService, LeadershipDirectoryRepository,
    RoleAssignmentAdminRepository, RoleAssignmentRepository, SecurityAdminService, UserService,
};
use congregate_core::AppError;
use congregate_infrastructure::{
    Argon2PasswordHasher, PostgresAuditRepository, PostgresAuthEventRepository,
    PostgresRoleAssignmentRepository, PostgresUserRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::api_config::{ApiConfig, RunMode, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    match config.run_mode {
        RunMode::MigrateOnly => {
            info!("database migrations applied successfully");
            return Ok(());
        }
        RunMode::Seed => {
            return dev_seed::run(pool, &config).await;
        }
        RunMode::Serve => {}
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let assignment_repository = Arc::new(PostgresRoleAssignmentRepository::new(pool.clone()));
    let authorization_service = AuthorizationService::new(
        assignment_repository.clone() as Arc<dyn RoleAssignmentRepository>,
        config.regular_member_grant,
    );
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        assignment_repository.clone() as Arc<dyn RoleAssignmentAdminRepository>,
        audit_repository,
    );
    let directory_service = DirectoryService::new(
        authorization_service,
        assignment_repository as Arc<dyn LeadershipDirectoryRepository>,
    );

    let auth_event_repository = Arc::new(PostgresAuthEventRepository::new(pool.clone()));
    let auth_event_service = AuthEventService::new(auth_event_repository);

    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let user_service = UserService::new(
        user_repository,
        password_hasher,
        auth_event_service.clone(),
    );

    let app_state = AppState {
        security_admin_service,
        directory_service,
        user_service,
        auth_event_service,
        frontend_url: config.frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route(
            "/api/security/assignments/{subject}",
            get(handlers::security::list_assignments_handler),
        )
        .route(
            "/api/security/assignments",
            post(handlers::security::grant_assignment_handler),
        )
        .route(
            "/api/security/assignment-removals",
            post(handlers::security::revoke_assignment_handler),
        )
        .route(
            "/api/centers/{center_id}/leadership",
            get(handlers::directory::center_leadership_handler),
        )
        .route(
            "/api/clusters/{cluster_id}/leadership",
            get(handlers::directory::cluster_leadership_handler),
        )
        .route(
            "/api/small-groups/{small_group_id}/leadership",
            get(handlers::directory::small_group_leadership_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "congregate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
