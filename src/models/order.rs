use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Product;

/// A client's request for a professional's product (table `commands`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub prof_id: String,
    pub product_id: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: String,
    pub prof_id: String,
    pub product_id: String,
    pub description: Option<String>,
}

/// An order with the product it was placed on embedded as `post`
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithProduct {
    #[serde(flatten)]
    pub order: Order,
    pub post: Option<Product>,
}
