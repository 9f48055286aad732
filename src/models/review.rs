use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored review or reply. Only roots (no parent) carry a rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: String,
    pub text: String,
    pub rating: Option<i32>,
    pub product_id: String,
    pub user_id: String,
    pub parent_id: Option<String>,
    pub date: DateTime<Utc>,
}

impl Review {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Public author fields embedded in every thread node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAuthor {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewWithAuthor {
    pub review: Review,
    pub author: ReviewAuthor,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub text: String,
    pub rating: Option<i32>,
    pub product_id: String,
    pub user_id: String,
    pub parent_id: Option<String>,
}

/// Edit applied by the author. `rating: None` leaves the stored rating untouched.
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub text: String,
    pub rating: Option<Option<i32>>,
}

/// Average and count over a product's rated root reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self {
            average: None,
            count: 0,
        }
    }
}
