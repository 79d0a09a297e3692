//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Standard error code constants
//! - Request/response DTOs for the wager API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "hunter2")]
    pub credential: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "hunter2")]
    pub credential: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RechargeRequest {
    #[schema(example = 100)]
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterData {
    pub username: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginData {
    /// Session bearer token, valid until logout
    pub token: Uuid,
    pub username: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountData {
    pub username: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceData {
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlayData {
    /// "win" or "lose"
    #[schema(example = "lose")]
    pub outcome: String,
    /// Signed balance change this round applied
    #[schema(example = -10)]
    pub delta: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardRow {
    pub username: String,
    pub balance: i64,
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const USERNAME_TAKEN: i32 = 1003;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const NO_ACCOUNTS: i32 = 2003;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}
