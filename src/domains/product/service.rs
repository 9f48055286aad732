// Product service - listing, detail pages and owner-scoped management

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::app_state::AppState;
use crate::domains::review::{ReviewNode, ReviewThread};
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;
use crate::models::{CurrentUser, NewProduct, Product, ProductChanges, Seller};

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Body of product create/update requests
#[derive(Debug, Default, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub image_location: Option<String>,
}

/// Validated product fields shared by create and update
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_location: Option<String>,
}

impl ProductFields {
    pub fn parse(payload: &ProductPayload) -> AppResult<Self> {
        let title = payload.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let description = payload
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if description.is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }

        let price = match &payload.price {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let price = match price {
            Some(p) if p.is_finite() && p >= 0.0 => p,
            _ => {
                return Err(AppError::Validation(
                    "Price must be greater than or equal to 0".to_string(),
                ))
            }
        };

        let image_location = payload
            .image_location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            price,
            image_location,
        })
    }
}

/// Product page: the product, its seller and its review thread
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub users: Option<Seller>,
    pub reviews: Vec<ReviewNode>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<dyn DatabaseInterface>,
    max_reply_depth: usize,
}

impl ProductService {
    pub fn new(db: Arc<dyn DatabaseInterface>, max_reply_depth: usize) -> Self {
        Self {
            db,
            max_reply_depth,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.database.clone(), state.config.reviews.max_reply_depth)
    }

    pub async fn list(&self) -> AppResult<Vec<Product>> {
        self.db.list_products().await
    }

    pub async fn list_for_user(&self, owner: &CurrentUser) -> AppResult<Vec<Product>> {
        self.db.list_products_for_user(&owner.id).await
    }

    pub async fn detail(&self, id: &str) -> AppResult<ProductDetail> {
        let product = self
            .db
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;
        let seller = self.db.get_seller(id).await?;

        let rows = self.db.list_product_reviews(id).await?;
        let reviews = ReviewThread::new(rows).roots(self.max_reply_depth);

        Ok(ProductDetail {
            product,
            users: seller,
            reviews,
        })
    }

    pub async fn create(&self, owner: &CurrentUser, payload: ProductPayload) -> AppResult<Product> {
        let fields = ProductFields::parse(&payload)?;
        let product = self
            .db
            .create_product(NewProduct {
                title: fields.title,
                description: fields.description,
                price: fields.price,
                date: None,
                image_location: fields.image_location,
                user_id: owner.id.clone(),
            })
            .await?;

        info!("User {} listed product {}", owner.id, product.id);
        Ok(product)
    }

    pub async fn update(&self, owner: &CurrentUser, payload: ProductPayload) -> AppResult<Product> {
        let id = required_id(&payload)?;
        let fields = ProductFields::parse(&payload)?;
        self.owned(owner, &id).await?;

        self.db
            .update_product(
                &id,
                ProductChanges {
                    title: fields.title,
                    description: fields.description,
                    price: fields.price,
                    date: None,
                    image_location: fields.image_location,
                },
            )
            .await?;

        self.db
            .get_product(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))
    }

    pub async fn delete(&self, owner: &CurrentUser, payload: ProductPayload) -> AppResult<String> {
        let id = required_id(&payload)?;
        self.owned(owner, &id).await?;

        self.db.delete_product(&id).await?;
        info!("User {} removed product {}", owner.id, id);
        Ok(id)
    }

    /// Products owned by someone else are reported as missing
    async fn owned(&self, owner: &CurrentUser, id: &str) -> AppResult<Product> {
        match self.db.get_product(id).await? {
            Some(product) if product.user_id == owner.id => Ok(product),
            _ => Err(AppError::NotFound(PRODUCT_NOT_FOUND.to_string())),
        }
    }
}

fn required_id(payload: &ProductPayload) -> AppResult<String> {
    payload
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("Product id is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteDatabase;
    use crate::models::{NewReview, NewUser};
    use serde_json::json;

    fn payload(body: Value) -> ProductPayload {
        serde_json::from_value(body).unwrap()
    }

    async fn owner(db: &dyn DatabaseInterface, email: &str) -> CurrentUser {
        db.create_user(NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Seller".to_string(),
            country: "NL".to_string(),
            birthday: None,
        })
        .await
        .unwrap()
        .into()
    }

    #[test]
    fn test_field_validation() {
        let ok = ProductFields::parse(&payload(json!({
            "title": " Logo ",
            "description": "Three concepts",
            "price": "12.5",
            "image_location": "  "
        })))
        .unwrap();
        assert_eq!(ok.title, "Logo");
        assert_eq!(ok.price, 12.5);
        assert_eq!(ok.image_location, None);

        let cases = [
            (json!({"description": "d", "price": 1}), "Title is required"),
            (json!({"title": "t", "price": 1}), "Description is required"),
            (json!({"title": "t", "description": "d", "price": -1}), "Price must be greater than or equal to 0"),
            (json!({"title": "t", "description": "d", "price": "abc"}), "Price must be greater than or equal to 0"),
            (json!({"title": "t", "description": "d"}), "Price must be greater than or equal to 0"),
        ];
        for (body, expected) in cases {
            match ProductFields::parse(&payload(body)) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, expected),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_owner_scoped_update_and_delete() {
        let db: Arc<dyn DatabaseInterface> = Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
        let service = ProductService::new(db.clone(), 3);
        let seller = owner(db.as_ref(), "seller@example.com").await;
        let other = owner(db.as_ref(), "other@example.com").await;

        let product = service
            .create(&seller, payload(json!({"title": "Logo", "description": "d", "price": 10})))
            .await
            .unwrap();

        let stolen = service
            .update(
                &other,
                payload(json!({"id": product.id, "title": "Mine", "description": "d", "price": 1})),
            )
            .await;
        assert!(matches!(stolen, Err(AppError::NotFound(_))));

        let updated = service
            .update(
                &seller,
                payload(json!({"id": product.id, "title": "Logo v2", "description": "d", "price": 15})),
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Logo v2");
        assert_eq!(updated.price, 15.0);

        assert_eq!(service.list_for_user(&seller).await.unwrap().len(), 1);
        assert!(service.list_for_user(&other).await.unwrap().is_empty());

        assert!(matches!(
            service.delete(&other, payload(json!({"id": product.id}))).await,
            Err(AppError::NotFound(_))
        ));
        let id = service
            .delete(&seller, payload(json!({"id": product.id})))
            .await
            .unwrap();
        assert_eq!(id, product.id);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detail_includes_seller_and_review_thread() {
        let db: Arc<dyn DatabaseInterface> = Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
        let service = ProductService::new(db.clone(), 3);
        let seller = owner(db.as_ref(), "seller@example.com").await;

        let product = service
            .create(&seller, payload(json!({"title": "Logo", "description": "d", "price": 10})))
            .await
            .unwrap();
        let root = db
            .create_review(NewReview {
                text: "Great".to_string(),
                rating: Some(5),
                product_id: product.id.clone(),
                user_id: seller.id.clone(),
                parent_id: None,
            })
            .await
            .unwrap();
        db.create_review(NewReview {
            text: "Thanks".to_string(),
            rating: None,
            product_id: product.id.clone(),
            user_id: seller.id.clone(),
            parent_id: Some(root.id.clone()),
        })
        .await
        .unwrap();

        let detail = service.detail(&product.id).await.unwrap();
        assert_eq!(detail.users.as_ref().map(|s| s.email.as_str()), Some("seller@example.com"));
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].replies.len(), 1);
        assert_eq!(detail.reviews[0].replies[0].review.text, "Thanks");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Logo");
        assert_eq!(json["users"]["country"], "NL");

        assert!(matches!(service.detail("missing").await, Err(AppError::NotFound(_))));
    }
}
