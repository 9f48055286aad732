// Database Interface - Low-level data access for the marketplace
// Each method is a single query; callers compose them without transactions

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    NewOrder, NewProduct, NewReview, NewUser, Order, Product, ProductChanges, RatingSummary, Review,
    ReviewUpdate, ReviewWithAuthor, Seller, User,
};

/// Database interface trait for marketplace operations
#[async_trait]
pub trait DatabaseInterface: Send + Sync {
    /// Verify the backing store answers queries
    async fn health_check(&self) -> AppResult<()>;

    // User operations
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn get_user(&self, id: &str) -> AppResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Deletes the user along with their products, reviews and orders
    async fn delete_user(&self, id: &str) -> AppResult<bool>;

    // Product operations
    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;
    async fn get_product(&self, id: &str) -> AppResult<Option<Product>>;
    async fn get_seller(&self, product_id: &str) -> AppResult<Option<Seller>>;
    async fn list_products(&self) -> AppResult<Vec<Product>>;
    async fn list_products_for_user(&self, user_id: &str) -> AppResult<Vec<Product>>;
    async fn update_product(&self, id: &str, changes: ProductChanges) -> AppResult<bool>;
    async fn delete_product(&self, id: &str) -> AppResult<bool>;

    /// Overwrite the cached aggregate rating columns of a product
    async fn update_product_rating(&self, product_id: &str, summary: RatingSummary)
        -> AppResult<()>;

    // Review operations
    async fn get_review(&self, id: &str) -> AppResult<Option<Review>>;
    async fn create_review(&self, review: NewReview) -> AppResult<Review>;
    async fn update_review(&self, id: &str, update: ReviewUpdate) -> AppResult<bool>;
    /// Deletes the review and, through the foreign key, its replies
    async fn delete_review(&self, id: &str) -> AppResult<bool>;

    /// Every review of a product (roots and replies) joined to its author,
    /// oldest first
    async fn list_product_reviews(&self, product_id: &str) -> AppResult<Vec<ReviewWithAuthor>>;

    /// Average and count over rated root reviews of a product
    async fn rating_summary(&self, product_id: &str) -> AppResult<RatingSummary>;

    /// Products on which the user has posted a rated root review
    async fn list_rated_product_ids(&self, user_id: &str) -> AppResult<Vec<String>>;

    // Order operations, newest first
    async fn create_order(&self, order: NewOrder) -> AppResult<Order>;
    async fn list_orders(&self) -> AppResult<Vec<Order>>;
    async fn list_orders_for_client(&self, client_id: &str) -> AppResult<Vec<Order>>;
    async fn list_orders_for_professional(&self, prof_id: &str) -> AppResult<Vec<Order>>;
}
