//! Global stores for application state.

pub mod catalog;

pub use catalog::{add_product, load_products, reset_catalog, CatalogStore, CATALOG};
