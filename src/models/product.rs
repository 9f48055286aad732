use chrono::{DateTime, Utc};
use serde::Serialize;

/// A listed service/product. `rating` and `rating_count` are a cache
/// maintained by the rating aggregator, never written by owners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    pub image_location: Option<String>,
    pub user_id: String,
    pub rating: Option<f64>,
    #[serde(rename = "ratingCount")]
    pub rating_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: Option<DateTime<Utc>>,
    pub image_location: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: Option<DateTime<Utc>>,
    pub image_location: Option<String>,
}

/// Seller fields shown on the product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seller {
    pub id: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub email: String,
}
