use std::sync::Arc;

use rust_decimal::Decimal;

use crate::models::product::{Product, ProductDraft};
use crate::store::{ProductRepository, StoreResult};

/// The fixed listing written by `POST /api/products/seed`.
pub fn default_catalog() -> Vec<ProductDraft> {
    vec![
        ProductDraft::new(
            "Dragon Ceramic Tea Set",
            "Hand-painted six-piece porcelain tea set",
            Decimal::new(14900, 2),
        ),
        ProductDraft::new(
            "Silk Embroidered Cushion",
            "45cm cushion cover with dragon embroidery",
            Decimal::new(4500, 2),
        ),
        ProductDraft::new(
            "LED Paper Lantern",
            "Rechargeable red lantern, pack of two",
            Decimal::new(3999, 2),
        ),
        ProductDraft::new(
            "Bamboo Steamer Basket",
            "Two-tier 25cm steamer with lid",
            Decimal::new(5500, 2),
        ),
        ProductDraft::new(
            "Jade Bead Bracelet",
            "Natural jade beads on elastic cord",
            Decimal::new(8900, 2),
        ),
    ]
}

#[derive(Clone)]
pub struct CatalogStore {
    products: Arc<dyn ProductRepository>,
}

impl CatalogStore {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        CatalogStore { products }
    }

    /// Replaces the whole catalogue with `items`. Running it again with the
    /// same list leaves the same catalogue behind.
    pub async fn seed(&self, items: Vec<ProductDraft>) -> StoreResult<Vec<Product>> {
        let products = self.products.replace_all(items).await?;
        tracing::info!(count = products.len(), "catalogue seeded");
        Ok(products)
    }

    pub async fn list_all(&self) -> StoreResult<Vec<Product>> {
        self.products.list_all().await
    }
}
