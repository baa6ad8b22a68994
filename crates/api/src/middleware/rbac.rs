//! Route guards layered over [`AuthUser`].
//!
//! Customer routes take [`RequireAuth`]; the caller becomes the booking
//! owner. Catalog, schedule, usage and completion routes take
//! [`RequireAdmin`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tailor_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Any caller holding a valid access token.
pub struct RequireAuth(pub AuthUser);

/// Shop staff only. Other roles get 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        AuthUser::from_request_parts(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        if caller.is_admin() {
            return Ok(Self(caller));
        }
        tracing::debug!(
            user_id = caller.user_id,
            role = %caller.role,
            path = %parts.uri.path(),
            "Refused non-admin caller",
        );
        Err(CoreError::Forbidden("Only shop staff may use this endpoint".into()).into())
    }
}
