//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

// Import handler types for schema registration
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AccountData, BalanceData, LeaderboardRow, LoginData, LoginRequest, PlayData, RechargeRequest,
    RegisterData, RegisterRequest,
};

/// Session-token authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Session auth: Bearer {token}, where {token} was returned by /api/v1/auth/login",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wagerhall API",
        version = "1.0.0",
        description = "Account ledger and wager game: register, log in, recharge, play rounds, leaderboard.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::register,
        crate::gateway::handlers::login,
        crate::gateway::handlers::logout,
        crate::gateway::handlers::get_account,
        crate::gateway::handlers::recharge,
        crate::gateway::handlers::play_round,
        crate::gateway::handlers::leaderboard,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            RegisterData,
            LoginRequest,
            LoginData,
            AccountData,
            BalanceData,
            RechargeRequest,
            PlayData,
            LeaderboardRow,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Session", description = "Session lifecycle (auth required)"),
        (name = "Account", description = "Balance queries and recharge (auth required)"),
        (name = "Game", description = "Wager rounds (auth required)"),
        (name = "Leaderboard", description = "Public top-players listing"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Wagerhall API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json();
        assert!(json.is_ok());
        let json_str = json.unwrap();
        assert!(json_str.contains("Wagerhall API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/auth/register"));
        assert!(paths.paths.contains_key("/api/v1/auth/login"));
        assert!(paths.paths.contains_key("/api/v1/game/play"));
        assert!(paths.paths.contains_key("/api/v1/public/leaderboard"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("session_token"));
    }
}
