//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use depot_core::error::CoreError;
use depot_core::roles::{can_decide, Role};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role that may approve or reject (admin or warehouse keeper).
pub struct RequireDecider(pub AuthUser);

impl FromRequestParts<AppState> for RequireDecider {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_decide(user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or Warehouse Keeper role required".into(),
            )));
        }
        Ok(RequireDecider(user))
    }
}

/// Requires the `admin` role.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
