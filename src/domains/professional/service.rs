// Public seller profiles

use std::sync::Arc;

use serde::Serialize;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;
use crate::models::Product;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalStats {
    pub total_products: usize,
    /// Mean of the cached ratings of rated products
    pub average_rating: Option<f64>,
    pub total_ratings: i64,
}

impl ProfessionalStats {
    pub fn from_products(posts: &[Product]) -> Self {
        let rated: Vec<&Product> = posts.iter().filter(|p| p.rating.is_some()).collect();
        let average_rating = if rated.is_empty() {
            None
        } else {
            let sum: f64 = rated.iter().filter_map(|p| p.rating).sum();
            Some(sum / rated.len() as f64)
        };

        Self {
            total_products: posts.len(),
            average_rating,
            total_ratings: rated.iter().map(|p| p.rating_count).sum(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfessionalProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub country: Option<String>,
    pub stats: ProfessionalStats,
    pub posts: Vec<Product>,
}

pub struct ProfessionalService {
    db: Arc<dyn DatabaseInterface>,
}

impl ProfessionalService {
    pub fn new(db: Arc<dyn DatabaseInterface>) -> Self {
        Self { db }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.database.clone())
    }

    pub async fn profile(&self, id: &str) -> AppResult<ProfessionalProfile> {
        let user = self
            .db
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Professional not found".to_string()))?;
        let posts = self.db.list_products_for_user(&user.id).await?;

        Ok(ProfessionalProfile {
            stats: ProfessionalStats::from_products(&posts),
            id: user.id,
            name: user.name,
            email: user.email,
            country: user.country,
            posts,
        })
    }
}
