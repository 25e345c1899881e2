//! Persistence seam. Services talk to these traits; `postgres` backs them
//! with a [`sqlx::PgPool`], `memory` keeps everything in-process for tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::{NewOrder, Order};
use crate::models::product::{Product, ProductDraft};
use crate::models::user::{NewUser, User};

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("stored record is invalid: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. Must reject a second user with the same email
    /// with [`StoreError::DuplicateEmail`] even under concurrent inserts.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Deletes every product, then inserts `drafts` in order.
    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> StoreResult<Vec<Product>>;
    /// Whole catalogue in storage order.
    async fn list_all(&self) -> StoreResult<Vec<Product>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stamps `created_at` at insertion time.
    async fn insert(&self, order: NewOrder) -> StoreResult<Order>;
    /// Newest first; orders created at the same instant fall back to
    /// insertion sequence, newest first.
    async fn list_recent(&self) -> StoreResult<Vec<Order>>;
}
