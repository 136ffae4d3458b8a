pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod lobbies;
pub mod messages;

use std::any::Any;

use axum::{
    Router,
    extract::{FromRef, FromRequest, FromRequestParts, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use sqlx::SqlitePool;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};

use auth::{CredentialStore, TokenService};
use lobbies::MembershipRegistry;
use messages::MessageLedger;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub registry: MembershipRegistry,
    pub ledger: MessageLedger,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, tokens: TokenService) -> Self {
        let credentials = CredentialStore::new(db_pool.clone());
        let registry = MembershipRegistry::new(db_pool.clone());
        let ledger = MessageLedger::new(db_pool.clone(), registry.clone(), credentials.clone());

        Self {
            db_pool,
            tokens,
            credentials,
            registry,
            ledger,
        }
    }
}

/// `Json` whose rejections become `AppError::InvalidInput`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` whose rejections become `AppError::InvalidInput`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(lobbies::router())
        .merge(messages::router())
        .with_state(state);

    with_layers(routes, cors)
}

/// CORS goes on last so that it wraps every response, the 500s built from
/// panics included.
fn with_layers(routes: Router, cors: CorsLayer) -> Router {
    routes
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
}

async fn health(State(db_pool): State<SqlitePool>) -> AppResult<StatusCode> {
    sqlx::query("SELECT 1").execute(&db_pool).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
