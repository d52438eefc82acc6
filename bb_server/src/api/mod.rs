//! HTTP API for the registration ledger.
//!
//! # Modules
//!
//! - [`tournaments`]: Public tournament listings and admin creation
//! - [`registrations`]: Player registration and the admin payment workflow
//! - [`middleware`]: Bearer-token authentication and the admin gate
//! - [`request_id`]: Request correlation and HTTP metrics
//! - [`token`]: JWT verification into a `CallerIdentity`
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                                        - Health check (public)
//! GET  /api/v1/tournaments                            - List tournaments (public)
//! GET  /api/v1/tournaments/{id}                       - Get tournament (public)
//! POST /api/v1/tournaments/{id}/registrations         - Register (auth)
//! GET  /api/v1/admin/registrations                    - List registrations (admin)
//! POST /api/v1/admin/registrations/{id}/confirm       - Confirm payment (admin)
//! POST /api/v1/admin/registrations/{id}/pending       - Revert to pending (admin)
//! POST /api/v1/admin/tournaments                      - Create tournament (admin)
//! GET  /api/v1/admin/dashboard                        - Dashboard figures (admin)
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod middleware;
pub mod registrations;
pub mod request_id;
pub mod token;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use battlebucks::db::StoreHealth;
use battlebucks::{
    LedgerError, LedgerStore, RegistrationError, RegistrationLedger, RegistrationManager,
    TournamentError, TournamentManager,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use self::token::TokenVerifier;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub tournaments: Arc<TournamentManager>,
    pub registrations: Arc<RegistrationManager>,
    pub ledger: Arc<RegistrationLedger>,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    /// Wire the managers and ledger to one store
    pub fn new(
        store: Arc<dyn LedgerStore>,
        ledger: RegistrationLedger,
        tokens: TokenVerifier,
    ) -> Self {
        Self {
            tournaments: Arc::new(TournamentManager::new(store.clone())),
            registrations: Arc::new(RegistrationManager::new(store.clone())),
            ledger: Arc::new(ledger),
            tokens: Arc::new(tokens),
            store,
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler's return type
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse { error: message }))
}

/// Map a ledger error to its HTTP response
pub fn ledger_error(e: LedgerError) -> ApiError {
    let status = match &e {
        LedgerError::InvalidReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::CapacityExceeded { .. } => StatusCode::CONFLICT,
        LedgerError::TransactionAborted(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, e.client_message())
}

/// Map a registration error to its HTTP response
pub fn registration_error(e: RegistrationError) -> ApiError {
    let status = match &e {
        RegistrationError::InvalidField { .. } | RegistrationError::MissingEmail => {
            StatusCode::BAD_REQUEST
        }
        RegistrationError::TournamentNotFound(_) | RegistrationError::NotFound(_) => {
            StatusCode::NOT_FOUND
        }
        RegistrationError::TournamentClosed(_) => StatusCode::CONFLICT,
        RegistrationError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, e.client_message())
}

/// Map a tournament error to its HTTP response
pub fn tournament_error(e: TournamentError) -> ApiError {
    let status = match &e {
        TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::InvalidField { .. } => StatusCode::BAD_REQUEST,
        TournamentError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, e.client_message())
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```rust,no_run
/// # use bb_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament));

    let player_routes = Router::new()
        .route(
            "/tournaments/{tournament_id}/registrations",
            post(registrations::register),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Layers run outermost-last: auth first, then the admin gate
    let admin_routes = Router::new()
        .route("/registrations", get(registrations::list_registrations))
        .route(
            "/registrations/{registration_id}/confirm",
            post(registrations::confirm_payment),
        )
        .route(
            "/registrations/{registration_id}/pending",
            post(registrations::revert_to_pending),
        )
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/dashboard", get(registrations::dashboard))
        .layer(axum::middleware::from_fn(middleware::admin_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(player_routes)
        .nest("/admin", admin_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers a ping, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.4.0","store":true,"timestamp":"2026-10-18T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
