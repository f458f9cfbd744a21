//! Catalog store: the product list every view renders from.
//!
//! Socket events, sibling-tab envelopes and form submissions all funnel
//! into [`add_product`]; the insert-if-absent transition in the shared
//! state machine makes those paths safe to overlap.

use dioxus::prelude::*;
use shopdash_shared::{CatalogState, Product};

use crate::api_client::ApiClient;
use crate::{log_error, log_info};

/// Catalog plus the fetch status views need to render it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStore {
    pub catalog: CatalogState,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub static CATALOG: GlobalSignal<CatalogStore> = Signal::global(CatalogStore::default);

/// Insert a product at the front of the list unless its id is already
/// present. Returns whether anything changed.
pub fn add_product(product: Product) -> bool {
    let inserted = CATALOG.write().catalog.add_product(product);
    if !inserted {
        log_info!("add_product: duplicate id, keeping existing entry");
    }
    inserted
}

/// Fetch a page of products and replace the catalog with it.
///
/// On failure the previous products stay on screen; only the error
/// message changes.
pub async fn load_products(client: &ApiClient) {
    {
        let mut store = CATALOG.write();
        store.is_loading = true;
        store.error = None;
    }
    match client
        .get_json::<shopdash_shared::ProductsResponse>("/products")
        .await
    {
        Ok(page) => {
            let mut store = CATALOG.write();
            store.catalog.set_page(page);
            store.is_loading = false;
        }
        Err(e) => {
            log_error!("load_products: {}", e);
            let mut store = CATALOG.write();
            store.error = Some(e.user_message());
            store.is_loading = false;
        }
    }
}

/// Drop everything (on logout).
pub fn reset_catalog() {
    *CATALOG.write() = CatalogStore::default();
}
