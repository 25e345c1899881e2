use axum::response::Json;
use serde_json::{json, Value};

use crate::error::AppError;

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Dragon Mart Online Backend Running"
    }))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Route")
}
