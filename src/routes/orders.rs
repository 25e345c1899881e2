use axum::{extract::State, http::StatusCode, response::Json};

use super::AppJson;
use crate::error::AppError;
use crate::models::order::{CustomerSnapshot, Order, OrderWithOwner, PlaceOrderRequest};
use crate::state::AppState;

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders.list_all().await?;
    Ok(Json(orders))
}

/// Guest order placement; the order has no owning user.
pub async fn place_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let customer = CustomerSnapshot {
        name: payload.customer_name,
        phone: payload.phone,
        address: payload.address,
    };
    let order = state
        .orders
        .create(None, payload.items.unwrap_or_default(), customer)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders_with_owner(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderWithOwner>>, AppError> {
    let orders = state.orders.list_all_with_owner().await?;
    Ok(Json(orders))
}
