// Order service - clients request a professional's product

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;
use crate::models::{CurrentUser, NewOrder, Order, OrderWithProduct, Product};

#[derive(Debug, Default, Deserialize)]
pub struct OrderPayload {
    #[serde(default, rename = "productId")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<dyn DatabaseInterface>,
}

impl OrderService {
    pub fn new(db: Arc<dyn DatabaseInterface>) -> Self {
        Self { db }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.database.clone())
    }

    /// Place an order on a product. The professional is the product's owner.
    pub async fn place(&self, client: &CurrentUser, payload: OrderPayload) -> AppResult<Order> {
        let product_id = payload
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("productId is required".to_string()))?;

        let product = self
            .db
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let description = payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let order = self
            .db
            .create_order(NewOrder {
                client_id: client.id.clone(),
                prof_id: product.user_id,
                product_id: product.id,
                description,
            })
            .await?;

        info!(
            "User {} ordered product {} from {}",
            client.id, order.product_id, order.prof_id
        );
        Ok(order)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Order>> {
        self.db.list_orders().await
    }

    /// Orders the user placed, with the product embedded
    pub async fn placed_by(&self, client: &CurrentUser) -> AppResult<Vec<OrderWithProduct>> {
        let orders = self.db.list_orders_for_client(&client.id).await?;
        self.with_products(orders).await
    }

    /// Orders the user received as a professional, with the product embedded
    pub async fn received_by(&self, professional: &CurrentUser) -> AppResult<Vec<OrderWithProduct>> {
        let orders = self.db.list_orders_for_professional(&professional.id).await?;
        self.with_products(orders).await
    }

    async fn with_products(&self, orders: Vec<Order>) -> AppResult<Vec<OrderWithProduct>> {
        let mut products: HashMap<String, Option<Product>> = HashMap::new();
        let mut result = Vec::with_capacity(orders.len());

        for order in orders {
            if !products.contains_key(&order.product_id) {
                let product = self.db.get_product(&order.product_id).await?;
                products.insert(order.product_id.clone(), product);
            }
            let post = products.get(&order.product_id).cloned().flatten();
            result.push(OrderWithProduct { order, post });
        }

        Ok(result)
    }
}
