//! JWT-based authentication extractor for Axum handlers.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use depot_core::approval::Actor;
use depot_core::error::CoreError;
use depot_core::roles::Role;
use depot_core::types::DbId;

use crate::auth::jwt::{validate_token, JwtConfig};
use crate::error::AppError;
use crate::query::WsParams;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub role: Role,
}

impl AuthUser {
    /// Resolve a raw token into a user. Shared by the header extractor and
    /// the WebSocket upgrade, which carries the token in the query string.
    pub fn from_token(token: &str, config: &JwtConfig) -> Result<Self, AppError> {
        let claims = validate_token(token, config).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;
        let role = claims.role.parse::<Role>().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Token carries unknown role '{}'",
                claims.role
            )))
        })?;
        Ok(AuthUser {
            user_id: claims.sub,
            role,
        })
    }

    /// The caller identity passed to workflow operations.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        AuthUser::from_token(token, &state.config.jwt)
    }
}

/// User authenticated from a `?token=` query parameter.
///
/// Browsers cannot set headers on a WebSocket handshake, so the upgrade
/// route authenticates through the query string instead. Declared before
/// `WebSocketUpgrade` in a handler, it refuses the request with 401 ahead of
/// any upgrade.
#[derive(Debug, Clone, Copy)]
pub struct QueryTokenUser(pub AuthUser);

impl FromRequestParts<AppState> for QueryTokenUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<WsParams>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let token = params.token.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing token query parameter".into()))
        })?;
        AuthUser::from_token(&token, &state.config.jwt).map(QueryTokenUser)
    }
}
