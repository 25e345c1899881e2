use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::catalog::default_catalog;
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.catalog.list_all().await?;
    Ok(Json(products))
}

pub async fn seed_products(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let products = state.catalog.seed(default_catalog()).await?;

    Ok(Json(json!({
        "success": true,
        "data": products
    })))
}
