use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{
    CustomerSnapshot, NewOrder, Order, OrderItem, OrderWithOwner, DEFAULT_ORDER_STATUS,
};
use crate::models::user::OwnerSummary;
use crate::store::{OrderRepository, UserRepository};

#[derive(Clone)]
pub struct OrderStore {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
}

impl OrderStore {
    pub fn new(orders: Arc<dyn OrderRepository>, users: Arc<dyn UserRepository>) -> Self {
        OrderStore { orders, users }
    }

    /// Records a new order with the default status. `items` is stored as a
    /// snapshot; later catalogue changes never touch it.
    pub async fn create(
        &self,
        owner_user_id: Option<Uuid>,
        items: Vec<OrderItem>,
        customer: CustomerSnapshot,
    ) -> Result<Order, AppError> {
        if items.is_empty() {
            return Err(AppError::EmptyCart);
        }
        validate_items(&items)?;
        validate_customer(&customer)?;

        let order = self
            .orders
            .insert(NewOrder {
                owner_user_id,
                items,
                customer,
                status: DEFAULT_ORDER_STATUS.to_string(),
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            owner = ?order.owner_user_id,
            items = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.list_recent().await?)
    }

    pub async fn list_all_with_owner(&self) -> Result<Vec<OrderWithOwner>, AppError> {
        let orders = self.orders.list_recent().await?;

        let owner_ids: Vec<Uuid> = orders
            .iter()
            .filter_map(|order| order.owner_user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let owners: HashMap<Uuid, OwnerSummary> = self
            .users
            .find_by_ids(&owner_ids)
            .await?
            .iter()
            .map(|user| (user.id, OwnerSummary::from(user)))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| {
                let owner = order
                    .owner_user_id
                    .and_then(|id| owners.get(&id).cloned());
                OrderWithOwner { order, owner }
            })
            .collect())
    }
}

fn validate_customer(customer: &CustomerSnapshot) -> Result<(), AppError> {
    if customer.name.trim().is_empty() || customer.phone.trim().is_empty() {
        return Err(AppError::Validation(
            "Customer name and phone are required".to_string(),
        ));
    }
    Ok(())
}

fn validate_items(items: &[OrderItem]) -> Result<(), AppError> {
    for (index, item) in items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(AppError::Validation(format!("items[{index}].name is required")));
        }
        if item.quantity == 0 {
            return Err(AppError::Validation(format!(
                "items[{index}].quantity must be at least 1"
            )));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "items[{index}].price must not be negative"
            )));
        }
    }
    Ok(())
}
