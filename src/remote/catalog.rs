use async_trait::async_trait;

use crate::{
    common::error::RemoteError,
    domain::{
        order::{NewOrder, Order, OrderId},
        product::{Product, ProductFilter},
    },
};

/// Raw access to the hosted catalog/order store. Implementations report
/// failures; `Catalog` decides what the caller sees.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn fetch_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RemoteError>;
    async fn fetch_product(&self, id: &str) -> Result<Option<Product>, RemoteError>;
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, RemoteError>;
    async fn fetch_orders(&self, user_id: &str) -> Result<Vec<Order>, RemoteError>;
}

/// Catalog facade that never fails: errors are logged and become empty
/// results, and nothing is retried.
#[derive(Debug, Clone)]
pub struct Catalog<B> {
    backend: B,
}

impl<B: CatalogBackend> Catalog<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> Vec<Product> {
        match self.backend.fetch_products(filter).await {
            Ok(products) => filter.apply(products),
            Err(e) => {
                tracing::error!(error = %e, "error getting products");
                Vec::new()
            }
        }
    }

    pub async fn get_product(&self, id: &str) -> Option<Product> {
        self.backend.fetch_product(id).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, product = id, "error getting product");
            None
        })
    }

    pub async fn create_order(&self, order: &NewOrder) -> Option<OrderId> {
        match self.backend.insert_order(order).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(error = %e, user = %order.user_id, "error creating order");
                None
            }
        }
    }

    /// The user's orders, newest first.
    pub async fn list_orders(&self, user_id: &str) -> Vec<Order> {
        match self.backend.fetch_orders(user_id).await {
            Ok(mut orders) => {
                orders.retain(|o| o.user_id == user_id);
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                orders
            }
            Err(e) => {
                tracing::error!(error = %e, user = user_id, "error getting user orders");
                Vec::new()
            }
        }
    }
}
