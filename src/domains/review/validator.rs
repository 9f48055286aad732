// Parent-reply validation: a reply may only hang under an existing review of
// the same product, and never deeper than the configured reply depth

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;

pub const DEFAULT_MAX_REPLY_DEPTH: usize = 3;

pub const PARENT_NOT_FOUND: &str = "Parent comment not found";
pub const MAX_DEPTH_REACHED: &str = "Maximum reply depth reached";

/// The review a new reply will be attached beneath
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentReview {
    pub id: String,
    pub product_id: String,
    pub parent_id: Option<String>,
}

pub struct ParentReplyValidator<'a> {
    db: &'a dyn DatabaseInterface,
    max_depth: usize,
}

impl<'a> ParentReplyValidator<'a> {
    pub fn new(db: &'a dyn DatabaseInterface, max_depth: usize) -> Self {
        Self { db, max_depth }
    }

    /// Walk from `parent_id` up to its root, one lookup per ancestor.
    ///
    /// The immediate parent counts as depth 1 and every ancestor hop adds one,
    /// even when the ancestor row has gone missing. Reaching `max_depth`
    /// before the root fails with `BadRequest`; a parent that does not exist
    /// or belongs to another product fails with `NotFound`.
    pub async fn validate(&self, product_id: &str, parent_id: &str) -> AppResult<ParentReview> {
        let parent = match self.db.get_review(parent_id).await? {
            Some(review) if review.product_id == product_id => review,
            _ => return Err(AppError::NotFound(PARENT_NOT_FOUND.to_string())),
        };

        let mut depth = 1;
        let mut ancestor_id = parent.parent_id.clone();

        while let Some(id) = ancestor_id {
            let ancestor = self.db.get_review(&id).await?;
            depth += 1;

            if depth >= self.max_depth {
                debug!(
                    "Rejecting reply under {}: depth {} reaches limit {}",
                    parent.id, depth, self.max_depth
                );
                return Err(AppError::BadRequest(MAX_DEPTH_REACHED.to_string()));
            }

            ancestor_id = ancestor.and_then(|a| a.parent_id);
        }

        debug!("Reply under {} accepted at depth {}", parent.id, depth);

        Ok(ParentReview {
            id: parent.id,
            product_id: parent.product_id,
            parent_id: parent.parent_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteDatabase;
    use crate::models::{NewProduct, NewReview, NewUser, Review};

    struct Fixture {
        db: SqliteDatabase,
        user_id: String,
        product_id: String,
        other_product_id: String,
    }

    async fn fixture() -> Fixture {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let user = db
            .create_user(NewUser {
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
                name: "Ada".to_string(),
                country: "BE".to_string(),
                birthday: None,
            })
            .await
            .unwrap();

        let mut products = Vec::new();
        for title in ["Logo design", "Copywriting"] {
            let product = db
                .create_product(NewProduct {
                    title: title.to_string(),
                    description: "desc".to_string(),
                    price: 10.0,
                    date: None,
                    image_location: None,
                    user_id: user.id.clone(),
                })
                .await
                .unwrap();
            products.push(product.id);
        }

        Fixture {
            db,
            user_id: user.id,
            product_id: products.remove(0),
            other_product_id: products.remove(0),
        }
    }

    impl Fixture {
        async fn review(&self, product_id: &str, parent: Option<&Review>) -> Review {
            self.db
                .create_review(NewReview {
                    text: "text".to_string(),
                    rating: if parent.is_none() { Some(4) } else { None },
                    product_id: product_id.to_string(),
                    user_id: self.user_id.clone(),
                    parent_id: parent.map(|p| p.id.clone()),
                })
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_reply_to_root_is_accepted() {
        let f = fixture().await;
        let root = f.review(&f.product_id, None).await;

        let validator = ParentReplyValidator::new(&f.db, DEFAULT_MAX_REPLY_DEPTH);
        let parent = validator.validate(&f.product_id, &root.id).await.unwrap();

        assert_eq!(
            parent,
            ParentReview {
                id: root.id.clone(),
                product_id: f.product_id.clone(),
                parent_id: None,
            }
        );
    }

    #[tokio::test]
    async fn test_reply_to_first_level_reply_is_accepted() {
        let f = fixture().await;
        let root = f.review(&f.product_id, None).await;
        let reply = f.review(&f.product_id, Some(&root)).await;

        let validator = ParentReplyValidator::new(&f.db, DEFAULT_MAX_REPLY_DEPTH);
        let parent = validator.validate(&f.product_id, &reply.id).await.unwrap();
        assert_eq!(parent.parent_id.as_deref(), Some(root.id.as_str()));
    }

    #[tokio::test]
    async fn test_reply_at_max_depth_is_rejected() {
        let f = fixture().await;
        let root = f.review(&f.product_id, None).await;
        let reply = f.review(&f.product_id, Some(&root)).await;
        let nested = f.review(&f.product_id, Some(&reply)).await;

        let validator = ParentReplyValidator::new(&f.db, DEFAULT_MAX_REPLY_DEPTH);
        let err = validator.validate(&f.product_id, &nested.id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == MAX_DEPTH_REACHED));
    }

    #[tokio::test]
    async fn test_limit_is_configurable() {
        let f = fixture().await;
        let root = f.review(&f.product_id, None).await;
        let reply = f.review(&f.product_id, Some(&root)).await;
        let nested = f.review(&f.product_id, Some(&reply)).await;

        let validator = ParentReplyValidator::new(&f.db, 4);
        assert!(validator.validate(&f.product_id, &nested.id).await.is_ok());

        let strict = ParentReplyValidator::new(&f.db, 2);
        assert!(matches!(
            strict.validate(&f.product_id, &reply.id).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let f = fixture().await;
        let validator = ParentReplyValidator::new(&f.db, DEFAULT_MAX_REPLY_DEPTH);

        let err = validator.validate(&f.product_id, "missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == PARENT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_parent_on_other_product_is_not_found_at_any_depth() {
        let f = fixture().await;
        let root = f.review(&f.other_product_id, None).await;
        let reply = f.review(&f.other_product_id, Some(&root)).await;
        let nested = f.review(&f.other_product_id, Some(&reply)).await;

        let validator = ParentReplyValidator::new(&f.db, DEFAULT_MAX_REPLY_DEPTH);
        for parent in [&root, &reply, &nested] {
            let err = validator.validate(&f.product_id, &parent.id).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }
}
