use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::OwnerSummary;

/// Status every order is created with. Nothing moves an order out of it.
pub const DEFAULT_ORDER_STATUS: &str = "Pending";

/// Snapshot of a product at the time it was ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub owner_user_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub customer: CustomerSnapshot,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner_user_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub customer: CustomerSnapshot,
    pub status: String,
}

/// An order as shown on the admin listing, with its owner resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithOwner {
    #[serde(flatten)]
    pub order: Order,
    pub owner: Option<OwnerSummary>,
}

/// Body of the legacy `POST /orders` route.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub customer: CustomerSnapshot,
}
