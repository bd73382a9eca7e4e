mod auth;
mod config;
mod db;
mod healthstack;
mod ping;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::token::TokenCodec;
use crate::config::Settings;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::login_access_token,
        auth::handlers::refresh_token,
        auth::handlers::register_user,
        auth::handlers::register_worker,
        users::handlers::read_user_me,
        users::handlers::update_user_me,
        users::handlers::delete_user_me,
        users::handlers::read_all_users,
        users::handlers::read_user,
        users::handlers::update_other_user,
        users::handlers::delete_other_user,
        healthstack::handlers::create_healthstack,
        healthstack::handlers::get_all_healthstacks,
        healthstack::handlers::get_my_healthstacks,
        healthstack::handlers::get_my_healthstack_by_id,
        healthstack::handlers::get_healthstack_by_id,
        healthstack::handlers::get_worker_healthstack_by_id,
        ping::handlers::make_single_ping,
        ping::handlers::make_many_pings,
    ),
    components(schemas(
        auth::models::TokenPair,
        auth::models::LoginForm,
        auth::models::RefreshRequest,
        auth::models::RegisterRequest,
        auth::models::WorkerRegisterRequest,
        auth::models::WorkerCredentials,
        auth::models::UserResponse,
        users::models::UserUpdate,
        users::models::UserUpdateAdmin,
        healthstack::models::HealthStack,
        healthstack::models::CreateHealthStack,
        ping::models::SinglePing,
        ping::models::ManyPings,
        ping::models::SinglePingResponse,
        ping::models::ManyPingsResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, token refresh and registration"),
        (name = "users", description = "User self-service and administration"),
        (name = "healthstack", description = "Monitored domain groups"),
        (name = "ping", description = "ICMP ping utility")
    ),
    info(
        title = "HealthStack API",
        version = "0.1.0",
        description = "Multi-tenant domain monitoring backend with JWT authentication"
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers: the connection pool plus the
/// immutable settings and token codec built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub codec: TokenCodec,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: PgPool, settings: Settings) -> Self {
        let codec = TokenCodec::new(
            settings.secret_key.as_bytes(),
            settings.access_token_expire_minutes,
            settings.refresh_token_expire_minutes,
        );
        Self {
            db,
            codec,
            settings: Arc::new(settings),
        }
    }
}

/// Records wall-clock handler time on every response, in seconds.
async fn process_time_header(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&elapsed.to_string()) {
        response.headers_mut().insert("process-time", value);
    }
    response
}

/// The credential endpoints, grouped so the rate limiter can wrap exactly
/// this subtree.
fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/access-token", post(auth::handlers::login_access_token))
        .route("/auth/refresh-token", post(auth::handlers::refresh_token))
        .route("/auth/register", post(auth::handlers::register_user))
        .route("/auth/register-worker", post(auth::handlers::register_worker))
}

/// Every route outside the auth subtree.
fn app_router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(users::handlers::read_user_me)
                .put(users::handlers::update_user_me)
                .delete(users::handlers::delete_user_me),
        )
        .route("/users", get(users::handlers::read_all_users))
        .route(
            "/users/:username",
            get(users::handlers::read_user)
                .put(users::handlers::update_other_user)
                .delete(users::handlers::delete_other_user),
        )
        .route("/healthstack/create", post(healthstack::handlers::create_healthstack))
        .route("/healthstack", get(healthstack::handlers::get_all_healthstacks))
        .route("/healthstack/me", get(healthstack::handlers::get_my_healthstacks))
        .route("/healthstack/me/:id", get(healthstack::handlers::get_my_healthstack_by_id))
        .route(
            "/healthstack/worker/me/:id",
            get(healthstack::handlers::get_worker_healthstack_by_id),
        )
        .route("/healthstack/:id", get(healthstack::handlers::get_healthstack_by_id))
        .route("/ping/single", post(ping::handlers::make_single_ping))
        .route("/ping/many", post(ping::handlers::make_many_pings))
}

/// All API routes without the outer middleware stack, so tests can drive
/// the handlers directly.
#[cfg(test)]
fn api_router() -> Router<AppState> {
    app_router().merge(auth_router())
}

/// Creates and configures the application router: API under /v1, Swagger UI,
/// CORS, per-peer rate limiting on the auth routes and the process-time
/// header.
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let governor_conf = Box::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(20)
            .finish()
            .expect("Invalid rate limiter configuration"),
    );

    // Credential endpoints are brute-forceable; only they get throttled
    let governed_auth = auth_router().layer(GovernorLayer {
        config: Box::leak(governor_conf),
    });

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/v1", app_router().merge(governed_auth))
        .layer(middleware::from_fn(process_time_header))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("HealthStack API - Starting...");

    let settings = Settings::from_env().expect("Invalid configuration");

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&settings.database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let addr = settings.bind_addr();
    let state = AppState::new(db_pool, settings);
    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("HealthStack API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}

#[cfg(test)]
mod tests;
