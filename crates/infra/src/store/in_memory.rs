use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use catalog_export_core::EntityId;
use catalog_export_products::Product;
use catalog_export_sales::Order;

use super::snapshot::CatalogSnapshot;
use super::r#trait::{OrderRepository, ProductRepository, StoreError};

#[derive(Debug, Default)]
struct CatalogState {
    products: BTreeMap<u64, Product>,
    orders: BTreeMap<u64, Order>,
}

/// In-memory catalog keyed by export cursor.
///
/// Intended for tests/dev and for serving a static JSON snapshot.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, StoreError> {
        let store = Self::new();
        for product in snapshot.products {
            store.upsert_product(product)?;
        }
        for order in snapshot.orders {
            store.upsert_order(order)?;
        }
        Ok(store)
    }

    /// Insert or replace a product by cursor.
    ///
    /// Embedded children are variants and therefore products in their own
    /// right; they are indexed too unless their cursor is already taken.
    pub fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        for variant in product.variants() {
            state.products.entry(variant.auto_increment).or_insert(variant);
        }
        state.products.insert(product.auto_increment, product);
        Ok(())
    }

    pub fn upsert_order(&self, order: Order) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        state.orders.insert(order.auto_increment, order);
        Ok(())
    }

    pub fn product_count(&self) -> usize {
        self.state.read().map(|s| s.products.len()).unwrap_or(0)
    }

    pub fn order_count(&self) -> usize {
        self.state.read().map(|s| s.orders.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalogStore {
    async fn products_from(&self, from_cursor: u64, limit: usize) -> Result<Vec<Product>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .products
            .range(from_cursor..)
            .take(limit)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn product_by_id(&self, id: EntityId) -> Result<Option<Product>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.products.values().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryCatalogStore {
    async fn orders_from(&self, from_cursor: u64, limit: usize) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .orders
            .range(from_cursor..)
            .take(limit)
            .map(|(_, o)| o.clone())
            .collect())
    }
}
