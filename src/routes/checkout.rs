use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};

use super::AppJson;
use crate::auth::TokenClaims;
use crate::error::AppError;
use crate::models::order::CheckoutRequest;
use crate::state::AppState;

pub async fn checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let order = state
        .orders
        .create(Some(claims.sub), payload.items, payload.customer)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "orderId": order.id,
            "message": "Order placed, awaiting payment"
        })),
    ))
}
