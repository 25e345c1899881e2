use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};

use super::AppJson;
use crate::auth::{CredentialError, Registration, TokenClaims, TokenSubject};
use crate::error::AppError;
use crate::models::user::{LoginRequest, RegisterRequest, UserProfile};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if [&payload.name, &payload.email, &payload.phone, &payload.password]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::Validation(
            "Name, email, phone and password are required".to_string(),
        ));
    }

    state
        .credentials
        .register(Registration {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password: payload.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created successfully"
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // unknown email and wrong password look the same to the caller
    let user = state
        .credentials
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|err| match err {
            CredentialError::NotFound | CredentialError::InvalidCredentials => {
                tracing::info!("login rejected");
                AppError::InvalidCredentials
            }
            other => other.into(),
        })?;

    let token = state.tokens.issue(&TokenSubject::from(&user))?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": user
    })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state.credentials.get_by_id(claims.sub).await?;
    Ok(Json(user))
}
