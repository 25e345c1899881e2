use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::{OrderRepository, ProductRepository, StoreError, StoreResult, UserRepository};
use crate::database::Database;
use crate::models::order::{CustomerSnapshot, NewOrder, Order, OrderItem};
use crate::models::product::{Product, ProductDraft};
use crate::models::user::{NewUser, Role, User};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    currency: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            currency: row.currency,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    owner_user_id: Option<Uuid>,
    items: Json<Vec<OrderItem>>,
    customer: Json<CustomerSnapshot>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            owner_user_id: row.owner_user_id,
            items: row.items.0,
            customer: row.customer.0,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, created_at";
const PRODUCT_COLUMNS: &str = "id, name, description, price, currency";
const ORDER_COLUMNS: &str = "id, owner_user_id, items, customer, status, created_at";

#[derive(Clone)]
pub struct PgUserRepository {
    db: Database,
}

impl PgUserRepository {
    pub fn new(db: Database) -> Self {
        PgUserRepository { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, name, email, phone, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|err| match err {
            // users_email_key backs email uniqueness when two registrations race
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail
            }
            other => StoreError::Backend(other),
        })?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgProductRepository {
    db: Database,
}

impl PgProductRepository {
    pub fn new(db: Database) -> Self {
        PgProductRepository { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn replace_all(&self, drafts: Vec<ProductDraft>) -> StoreResult<Vec<Product>> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;

        let mut products = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let row = sqlx::query_as::<_, ProductRow>(&format!(
                "INSERT INTO products (id, name, description, price, currency) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {PRODUCT_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(&draft.currency)
            .fetch_one(&mut *tx)
            .await?;
            products.push(row.into());
        }

        tx.commit().await?;
        Ok(products)
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY seq ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[derive(Clone)]
pub struct PgOrderRepository {
    db: Database,
}

impl PgOrderRepository {
    pub fn new(db: Database) -> Self {
        PgOrderRepository { db }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: NewOrder) -> StoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, owner_user_id, items, customer, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(order.owner_user_id)
        .bind(Json(&order.items))
        .bind(Json(&order.customer))
        .bind(&order.status)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn list_recent(&self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, seq DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}
