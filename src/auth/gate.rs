use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::token::TokenClaims;
use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// Verifies the bearer token and stores its [`TokenClaims`] in the request
/// extensions for the handlers behind it.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| reject("Authorization header is missing"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| reject("Authorization header must be `Bearer <token>`"))?;

    let claims = state.tokens.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "bearer token rejected");
        AppError::from(err)
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must run after [`require_auth`].
pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<TokenClaims>()
        .ok_or_else(|| reject("Authentication required"))?;

    if claims.role != required {
        tracing::debug!(user_id = %claims.sub, role = %claims.role, required = %required, "role check failed");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}

fn reject(message: &str) -> AppError {
    tracing::debug!(reason = message, "request rejected by auth gate");
    AppError::Unauthenticated(message.to_string())
}
