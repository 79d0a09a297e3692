//! HTTP handlers for the wager API
//!
//! Every handler returns the unified `ApiResponse` envelope. Ledger calls
//! are short blocking read-modify-writes over the account file, so they
//! run on the blocking pool rather than the async workers.

use axum::{Extension, Json, extract::Query, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use utoipa::ToSchema;

use super::SessionToken;
use super::state::AppState;
use super::types::{
    AccountData, ApiResponse, BalanceData, LeaderboardQuery, LeaderboardRow, LoginData,
    LoginRequest, PlayData, RechargeRequest, RegisterData, RegisterRequest, error_codes,
};
use crate::ledger::LedgerError;
use crate::session::Session;

/// Leaderboard length when the caller does not pass `limit`
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

type ErrorReply = (StatusCode, Json<ApiResponse<()>>);

// ============================================================================
// Error mapping
// ============================================================================

fn internal_error() -> ErrorReply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            error_codes::INTERNAL_ERROR,
            "internal error",
        )),
    )
}

/// Map a ledger failure onto (HTTP status, API error code, message).
/// User-correctable errors carry their own message; store/hash failures
/// surface as a generic internal error and are only logged.
fn ledger_error_reply(err: LedgerError) -> ErrorReply {
    let (status, code) = match &err {
        LedgerError::InvalidUsername | LedgerError::InvalidAmount => {
            (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER)
        }
        LedgerError::InsufficientFunds => {
            (StatusCode::BAD_REQUEST, error_codes::INSUFFICIENT_BALANCE)
        }
        LedgerError::UsernameTaken(_) => (StatusCode::CONFLICT, error_codes::USERNAME_TAKEN),
        LedgerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
        LedgerError::NoAccounts => (StatusCode::UNAUTHORIZED, error_codes::NO_ACCOUNTS),
        LedgerError::UnknownAccount(_) => (StatusCode::NOT_FOUND, error_codes::ACCOUNT_NOT_FOUND),
        LedgerError::Overflow | LedgerError::Hash(_) | LedgerError::Store(_) => {
            tracing::error!("ledger operation failed: {:?}", err);
            return internal_error();
        }
    };
    (status, Json(ApiResponse::<()>::error(code, err.to_string())))
}

/// Run a ledger operation on the blocking pool.
async fn run_ledger<T, F>(state: &Arc<AppState>, op: F) -> Result<T, ErrorReply>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, LedgerError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state))
        .await
        .map_err(|e| {
            tracing::error!("ledger task failed to join: {}", e);
            internal_error()
        })?
        .map_err(ledger_error_reply)
}

// ============================================================================
// Auth
// ============================================================================

/// Register a new account
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created with the starting balance", body = ApiResponse<RegisterData>),
        (status = 400, description = "Invalid username"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterData>>), ErrorReply> {
    let account =
        run_ledger(&state, move |s| s.ledger.register(&req.username, &req.credential)).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterData {
            username: account.username().to_string(),
            balance: account.balance(),
        })),
    ))
}

/// Log in and open a session
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginData>),
        (status = 401, description = "Invalid credentials or no registered accounts")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoginData>>), ErrorReply> {
    let account = run_ledger(&state, move |s| {
        s.ledger.authenticate(&req.username, &req.credential)
    })
    .await?;

    let token = state.sessions.open(account.username(), account.balance());
    tracing::info!(username = account.username(), "session opened");
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(LoginData {
            token,
            username: account.username().to_string(),
            balance: account.balance(),
        })),
    ))
}

/// Log out, dropping the session
///
/// POST /api/v1/session/logout
#[utoipa::path(
    post,
    path = "/api/v1/session/logout",
    responses(
        (status = 200, description = "Session closed"),
        (status = 401, description = "Missing or invalid session token")
    ),
    tag = "Session"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
    Extension(session): Extension<Session>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    state.sessions.close(&token.0);
    tracing::info!(username = session.username, "session closed");
    (StatusCode::OK, Json(ApiResponse::success(())))
}

// ============================================================================
// Account
// ============================================================================

/// Current account state for the logged-in user
///
/// GET /api/v1/account
#[utoipa::path(
    get,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Username and stored balance", body = ApiResponse<AccountData>),
        (status = 401, description = "Missing or invalid session token")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
    Extension(session): Extension<Session>,
) -> Result<(StatusCode, Json<ApiResponse<AccountData>>), ErrorReply> {
    let username = session.username.clone();
    let balance = run_ledger(&state, move |s| s.ledger.balance_of(&username)).await?;
    state.sessions.update_balance(&token.0, balance);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(AccountData {
            username: session.username,
            balance,
        })),
    ))
}

/// Recharge the logged-in user's balance
///
/// POST /api/v1/account/recharge
#[utoipa::path(
    post,
    path = "/api/v1/account/recharge",
    request_body = RechargeRequest,
    responses(
        (status = 200, description = "New balance after the recharge", body = ApiResponse<BalanceData>),
        (status = 400, description = "Amount below 1"),
        (status = 401, description = "Missing or invalid session token")
    ),
    tag = "Account"
)]
pub async fn recharge(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
    Extension(session): Extension<Session>,
    Json(req): Json<RechargeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BalanceData>>), ErrorReply> {
    let username = session.username.clone();
    let balance = run_ledger(&state, move |s| s.ledger.recharge(&username, req.amount)).await?;
    state.sessions.update_balance(&token.0, balance);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(BalanceData { balance })),
    ))
}

// ============================================================================
// Game
// ============================================================================

/// Play one wager round
///
/// POST /api/v1/game/play
#[utoipa::path(
    post,
    path = "/api/v1/game/play",
    responses(
        (status = 200, description = "Round resolved and persisted", body = ApiResponse<PlayData>),
        (status = 400, description = "Balance is empty, recharge first"),
        (status = 401, description = "Missing or invalid session token")
    ),
    tag = "Game"
)]
pub async fn play_round(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<SessionToken>,
    Extension(session): Extension<Session>,
) -> Result<(StatusCode, Json<ApiResponse<PlayData>>), ErrorReply> {
    let username = session.username.clone();
    let round = run_ledger(&state, move |s| s.ledger.play_round(&username)).await?;
    state.sessions.update_balance(&token.0, round.balance);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(PlayData {
            outcome: round.outcome.to_string(),
            delta: round.delta,
            balance: round.balance,
        })),
    ))
}

// ============================================================================
// Leaderboard
// ============================================================================

/// Top players by balance
///
/// GET /api/v1/public/leaderboard?limit=5
#[utoipa::path(
    get,
    path = "/api/v1/public/leaderboard",
    params(
        ("limit" = Option<usize>, Query, description = "Number of entries (default 5)")
    ),
    responses(
        (status = 200, description = "Players sorted by balance, descending", body = ApiResponse<Vec<LeaderboardRow>>)
    ),
    tag = "Leaderboard"
)]
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<LeaderboardRow>>>), ErrorReply> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_SIZE);
    let rows = run_ledger(&state, move |s| s.ledger.top_players(limit)).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            rows.into_iter()
                .map(|(username, balance)| LeaderboardRow { username, balance })
                .collect(),
        )),
    ))
}

// ============================================================================
// System
// ============================================================================

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    /// Git revision this binary was built from
    #[schema(example = "a1b2c3d")]
    pub build: &'static str,
}

/// Health check endpoint
///
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>)
    ),
    tag = "System"
)]
pub async fn health_check() -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    (
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms,
            build: env!("GIT_HASH"),
        })),
    )
}
