use std::sync::Arc;

use crate::auth::{CredentialStore, TokenService};
use crate::catalog::CatalogStore;
use crate::database::Database;
use crate::orders::OrderStore;
use crate::store::postgres::{PgOrderRepository, PgProductRepository, PgUserRepository};
use crate::store::{OrderRepository, ProductRepository, UserRepository};

#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub tokens: TokenService,
    pub catalog: CatalogStore,
    pub orders: OrderStore,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        tokens: TokenService,
    ) -> Self {
        AppState {
            credentials: CredentialStore::new(users.clone()),
            tokens,
            catalog: CatalogStore::new(products),
            orders: OrderStore::new(orders, users),
        }
    }

    /// Wires every store to the same PostgreSQL pool.
    pub fn with_database(db: Database, tokens: TokenService) -> Self {
        AppState::new(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgProductRepository::new(db.clone())),
            Arc::new(PgOrderRepository::new(db)),
            tokens,
        )
    }
}
