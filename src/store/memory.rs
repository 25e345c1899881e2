use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{OrderRepository, ProductRepository, StoreError, StoreResult, UserRepository};
use crate::models::order::{NewOrder, Order};
use crate::models::product::{Product, ProductDraft};
use crate::models::user::{NewUser, User};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> StoreResult<Vec<Product>> {
        let mut products = self.products.lock().await;
        products.clear();
        products.extend(drafts.into_iter().map(|draft| Product {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            currency: draft.currency,
        }));
        Ok(products.clone())
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.lock().await.clone())
    }
}

#[derive(Default)]
pub struct MemoryOrderRepository {
    // kept in insertion order
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert(&self, order: NewOrder) -> StoreResult<Order> {
        let stored = Order {
            id: Uuid::new_v4(),
            owner_user_id: order.owner_user_id,
            items: order.items,
            customer: order.customer,
            status: order.status,
            created_at: Utc::now(),
        };
        self.orders.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self) -> StoreResult<Vec<Order>> {
        let orders = self.orders.lock().await;
        let mut recent: Vec<(usize, Order)> = orders.iter().cloned().enumerate().collect();
        recent.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(recent.into_iter().map(|(_, order)| order).collect())
    }
}
