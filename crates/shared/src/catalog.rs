//! Catalog state and its two transitions.
//!
//! The catalog supports exactly two mutations: a wholesale **replace**
//! from a fetch, and an **insert-if-absent** from a realtime event. The
//! insert is idempotent per product id, which is what keeps the catalog
//! eventually consistent when the same product arrives via both the
//! socket echo and the cross-tab channel.

use serde::{Deserialize, Serialize};

use crate::models::{Product, ProductsResponse};

/// The product collection plus pagination metadata mirrored from the
/// last fetch. Created empty at session start; never cleared by the
/// realtime connection's own lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogState {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u32,
    pub limit: u32,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            total: 0,
            skip: 0,
            limit: 10,
        }
    }
}

impl CatalogState {
    /// Prepend a product arriving from the realtime path.
    ///
    /// No-op when an entry with the same id already exists; `total` is
    /// only bumped on an actual insertion. Returns whether it inserted.
    pub fn add_product(&mut self, product: Product) -> bool {
        if self.products.iter().any(|p| p.id == product.id) {
            return false;
        }
        self.products.insert(0, product);
        self.total += 1;
        true
    }

    /// Replace the collection and pagination metadata with a fetched page.
    pub fn set_page(&mut self, page: ProductsResponse) {
        self.products = page.products;
        self.total = page.total;
        self.skip = page.skip;
        self.limit = page.limit;
    }
}
