pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Json,
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use state::AppState;
use types::{ApiResponse, error_codes};

/// Token of the session a request was authenticated with, injected into
/// request extensions by `session_auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct SessionToken(pub Uuid);

/// Axum middleware resolving the bearer token against the session
/// registry. Injects `SessionToken` and the matching `Session` for the
/// handler.
async fn session_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::MISSING_AUTH,
                "Missing Authorization header",
            )),
        ))?;

    if !auth_header.starts_with("Bearer ") {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Invalid token format",
            )),
        ));
    }

    // 2. Resolve the session
    let stale_session = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Invalid or expired session token",
            )),
        )
    };
    let token = Uuid::parse_str(&auth_header[7..]).map_err(|_| stale_session())?;
    let session = state.sessions.get(&token).ok_or_else(stale_session)?;

    // 3. Inject session for the handler
    request.extensions_mut().insert(SessionToken(token));
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Start the HTTP gateway
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) {
    // ==========================================================================
    // Auth routes (no session required)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    // ==========================================================================
    // Session-protected routes
    // ==========================================================================
    let protected_routes = Router::new()
        .route("/api/v1/session/logout", post(handlers::logout))
        .route("/api/v1/account", get(handlers::get_account))
        .route("/api/v1/account/recharge", post(handlers::recharge))
        .route("/api/v1/game/play", post(handlers::play_round))
        .layer(from_fn_with_state(state.clone(), session_auth_middleware));

    // ==========================================================================
    // Public routes
    // ==========================================================================
    let public_routes = Router::new().route("/leaderboard", get(handlers::leaderboard));

    // Build complete router
    let app = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/public", public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()));

    // Bind address
    let addr = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                config.port, config.port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    // Start server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
