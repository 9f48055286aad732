// Review service - business rules for threaded product reviews

use std::sync::Arc;

use tracing::info;

use super::input::{CreateReplyInput, CreateReviewInput, RatingInput, UpdateReviewInput};
use super::rating::recompute_product_rating;
use super::thread::{ReviewNode, ReviewThread};
use super::validator::ParentReplyValidator;
use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;
use crate::models::{CurrentUser, NewReview, Review, ReviewAuthor, ReviewUpdate};

const EMPTY_COMMENT: &str = "Comment cannot be empty";
const INVALID_RATING: &str = "Rating must be between 1 and 5";
const REPLY_WITH_RATING: &str = "Replies cannot include a rating";
const COMMENT_NOT_FOUND: &str = "Comment not found";
const COMMENT_ID_REQUIRED: &str = "Comment id is required";

#[derive(Clone)]
pub struct ReviewService {
    db: Arc<dyn DatabaseInterface>,
    max_reply_depth: usize,
}

impl ReviewService {
    pub fn new(db: Arc<dyn DatabaseInterface>, max_reply_depth: usize) -> Self {
        Self {
            db,
            max_reply_depth,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.database.clone(), state.config.reviews.max_reply_depth)
    }

    fn validator(&self) -> ParentReplyValidator<'_> {
        ParentReplyValidator::new(self.db.as_ref(), self.max_reply_depth)
    }

    /// Root reviews of a product, newest first, nested down to the reply limit
    pub async fn list_thread(&self, product_id: &str) -> AppResult<Vec<ReviewNode>> {
        let rows = self.db.list_product_reviews(product_id).await?;
        Ok(ReviewThread::new(rows).roots(self.max_reply_depth))
    }

    /// Post a rated root review, or a reply when `parent_id` is set
    pub async fn create_review(
        &self,
        author: &CurrentUser,
        product_id: &str,
        input: CreateReviewInput,
    ) -> AppResult<ReviewNode> {
        if input.text.is_empty() {
            return Err(AppError::BadRequest(EMPTY_COMMENT.to_string()));
        }

        let root_rating = input.rating.valid_score();
        if input.parent_id.is_none() && root_rating.is_none() {
            return Err(AppError::BadRequest(INVALID_RATING.to_string()));
        }

        if self.db.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        let rating = match &input.parent_id {
            Some(parent_id) => {
                self.validator().validate(product_id, parent_id).await?;
                if !input.rating.is_empty() {
                    return Err(AppError::BadRequest(REPLY_WITH_RATING.to_string()));
                }
                None
            }
            None => root_rating,
        };

        let review = self
            .db
            .create_review(NewReview {
                text: input.text,
                rating,
                product_id: product_id.to_string(),
                user_id: author.id.clone(),
                parent_id: input.parent_id,
            })
            .await?;

        recompute_product_rating(self.db.as_ref(), product_id).await?;
        info!("User {} posted review {} on {}", author.id, review.id, product_id);

        Ok(leaf_node(review, author))
    }

    /// Edit text, and for root reviews optionally the rating
    pub async fn update_review(
        &self,
        editor: &CurrentUser,
        product_id: &str,
        input: UpdateReviewInput,
    ) -> AppResult<ReviewNode> {
        if input.id.is_empty() {
            return Err(AppError::BadRequest(COMMENT_ID_REQUIRED.to_string()));
        }
        if input.text.is_empty() {
            return Err(AppError::BadRequest(EMPTY_COMMENT.to_string()));
        }

        let existing = self.find_on_product(&input.id, product_id).await?;

        let rating = match input.rating {
            RatingInput::Absent => None,
            _ if !existing.is_root() => {
                return Err(AppError::BadRequest(REPLY_WITH_RATING.to_string()));
            }
            RatingInput::Empty => Some(None),
            other => match other.valid_score() {
                Some(score) => Some(Some(score)),
                None => return Err(AppError::BadRequest(INVALID_RATING.to_string())),
            },
        };

        if existing.user_id != editor.id {
            return Err(AppError::Forbidden(
                "You can only edit your own comment".to_string(),
            ));
        }

        let updated = self
            .db
            .update_review(
                &existing.id,
                ReviewUpdate {
                    text: input.text,
                    rating,
                },
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound(COMMENT_NOT_FOUND.to_string()));
        }

        recompute_product_rating(self.db.as_ref(), product_id).await?;

        self.subtree(product_id, &existing.id).await
    }

    /// Delete a review together with every reply beneath it
    pub async fn delete_review(
        &self,
        requester: &CurrentUser,
        product_id: &str,
        id: &str,
    ) -> AppResult<String> {
        if id.is_empty() {
            return Err(AppError::BadRequest(COMMENT_ID_REQUIRED.to_string()));
        }

        let existing = self.find_on_product(id, product_id).await?;
        if existing.user_id != requester.id {
            return Err(AppError::Forbidden(
                "You can only delete your own comment".to_string(),
            ));
        }

        self.db.delete_review(&existing.id).await?;
        recompute_product_rating(self.db.as_ref(), product_id).await?;
        info!("User {} deleted review {} on {}", requester.id, existing.id, product_id);

        Ok(existing.id)
    }

    /// Replies to `parent_id`, oldest first, one nested level below them
    pub async fn list_replies(
        &self,
        product_id: &str,
        parent_id: Option<&str>,
    ) -> AppResult<Vec<ReviewNode>> {
        let parent_id = parent_id.map(str::trim).filter(|p| !p.is_empty()).ok_or_else(|| {
            AppError::BadRequest("parentId query parameter is required".to_string())
        })?;

        let parent = self.validator().validate(product_id, parent_id).await?;
        let rows = self.db.list_product_reviews(product_id).await?;

        Ok(ReviewThread::new(rows).replies_of(&parent.id, self.max_reply_depth.saturating_sub(1)))
    }

    /// Attach an unrated reply under an existing review
    pub async fn create_reply(
        &self,
        author: &CurrentUser,
        product_id: &str,
        input: CreateReplyInput,
    ) -> AppResult<ReviewNode> {
        if input.text.is_empty() {
            return Err(AppError::BadRequest("Reply cannot be empty".to_string()));
        }
        let parent_id = input
            .parent_id
            .ok_or_else(|| AppError::BadRequest("parentId is required".to_string()))?;

        let parent = self.validator().validate(product_id, &parent_id).await?;

        let review = self
            .db
            .create_review(NewReview {
                text: input.text,
                rating: None,
                product_id: product_id.to_string(),
                user_id: author.id.clone(),
                parent_id: Some(parent.id),
            })
            .await?;
        info!("User {} replied {} on {}", author.id, review.id, product_id);

        Ok(leaf_node(review, author))
    }

    /// A review with its replies nested down to the reply limit
    async fn subtree(&self, product_id: &str, id: &str) -> AppResult<ReviewNode> {
        let rows = self.db.list_product_reviews(product_id).await?;
        ReviewThread::new(rows)
            .node(id, self.max_reply_depth)
            .ok_or_else(|| AppError::NotFound(COMMENT_NOT_FOUND.to_string()))
    }

    async fn find_on_product(&self, id: &str, product_id: &str) -> AppResult<Review> {
        match self.db.get_review(id).await? {
            Some(review) if review.product_id == product_id => Ok(review),
            _ => Err(AppError::NotFound(COMMENT_NOT_FOUND.to_string())),
        }
    }
}

fn leaf_node(review: Review, author: &CurrentUser) -> ReviewNode {
    ReviewNode {
        review,
        author: ReviewAuthor {
            id: author.id.clone(),
            name: author.name.clone(),
        },
        replies: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteDatabase;
    use crate::models::{NewProduct, NewUser};
    use serde_json::{json, Value};

    struct Setup {
        service: ReviewService,
        db: Arc<dyn DatabaseInterface>,
        alice: CurrentUser,
        bob: CurrentUser,
        product_id: String,
    }

    async fn user(db: &dyn DatabaseInterface, email: &str, name: &str) -> CurrentUser {
        db.create_user(NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: name.to_string(),
            country: "BE".to_string(),
            birthday: None,
        })
        .await
        .unwrap()
        .into()
    }

    async fn setup() -> Setup {
        let db: Arc<dyn DatabaseInterface> = Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
        let alice = user(db.as_ref(), "alice@example.com", "Alice").await;
        let bob = user(db.as_ref(), "bob@example.com", "Bob").await;
        let product = db
            .create_product(NewProduct {
                title: "Logo design".to_string(),
                description: "Three concepts".to_string(),
                price: 50.0,
                date: None,
                image_location: None,
                user_id: bob.id.clone(),
            })
            .await
            .unwrap();

        Setup {
            service: ReviewService::new(db.clone(), 3),
            db,
            alice,
            bob,
            product_id: product.id,
        }
    }

    fn review(text: &str, rating: Value, parent: Option<&str>) -> CreateReviewInput {
        CreateReviewInput {
            text: text.to_string(),
            rating: RatingInput::parse(Some(&rating)),
            parent_id: parent.map(str::to_string),
        }
    }

    fn edit(id: &str, text: &str, rating: Option<Value>) -> UpdateReviewInput {
        UpdateReviewInput {
            id: id.to_string(),
            text: text.to_string(),
            rating: RatingInput::parse(rating.as_ref()),
        }
    }

    fn bad_request(result: AppResult<impl std::fmt::Debug>, expected: &str) {
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, expected),
            other => panic!("expected BadRequest({}), got {:?}", expected, other),
        }
    }

    #[tokio::test]
    async fn test_create_root_review_updates_product_rating() {
        let s = setup().await;
        let node = s
            .service
            .create_review(&s.alice, &s.product_id, review("Great", json!(4), None))
            .await
            .unwrap();

        assert_eq!(node.review.rating, Some(4));
        assert_eq!(node.author.name.as_deref(), Some("Alice"));
        assert!(node.replies.is_empty());

        let product = s.db.get_product(&s.product_id).await.unwrap().unwrap();
        assert_eq!(product.rating, Some(4.0));
        assert_eq!(product.rating_count, 1);
    }

    #[tokio::test]
    async fn test_create_validation_order() {
        let s = setup().await;

        bad_request(
            s.service
                .create_review(&s.alice, &s.product_id, review("", json!(9), None))
                .await,
            EMPTY_COMMENT,
        );
        bad_request(
            s.service
                .create_review(&s.alice, &s.product_id, review("Hi", json!(0), None))
                .await,
            INVALID_RATING,
        );
        bad_request(
            s.service
                .create_review(&s.alice, &s.product_id, review("Hi", json!(null), None))
                .await,
            INVALID_RATING,
        );

        let missing_product = s
            .service
            .create_review(&s.alice, "nope", review("Hi", json!(3), None))
            .await;
        assert!(matches!(missing_product, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reply_through_create_rejects_rating() {
        let s = setup().await;
        let root = s
            .service
            .create_review(&s.alice, &s.product_id, review("Great", json!(5), None))
            .await
            .unwrap();

        bad_request(
            s.service
                .create_review(&s.bob, &s.product_id, review("Thanks", json!(5), Some(&root.review.id)))
                .await,
            REPLY_WITH_RATING,
        );

        let reply = s
            .service
            .create_review(&s.bob, &s.product_id, review("Thanks", json!(null), Some(&root.review.id)))
            .await
            .unwrap();
        assert_eq!(reply.review.rating, None);
        assert_eq!(reply.review.parent_id.as_deref(), Some(root.review.id.as_str()));
    }

    #[tokio::test]
    async fn test_update_rules() {
        let s = setup().await;
        let root = s
            .service
            .create_review(&s.alice, &s.product_id, review("Great", json!(5), None))
            .await
            .unwrap();
        let reply = s
            .service
            .create_reply(
                &s.bob,
                &s.product_id,
                CreateReplyInput {
                    text: "Thanks".to_string(),
                    parent_id: Some(root.review.id.clone()),
                },
            )
            .await
            .unwrap();

        bad_request(
            s.service
                .update_review(&s.bob, &s.product_id, edit(&reply.review.id, "Thx", Some(json!(3))))
                .await,
            REPLY_WITH_RATING,
        );
        bad_request(
            s.service
                .update_review(&s.alice, &s.product_id, edit("", "x", None))
                .await,
            COMMENT_ID_REQUIRED,
        );
        // rating validation precedes the ownership check
        bad_request(
            s.service
                .update_review(&s.bob, &s.product_id, edit(&root.review.id, "x", Some(json!(7))))
                .await,
            INVALID_RATING,
        );

        let forbidden = s
            .service
            .update_review(&s.bob, &s.product_id, edit(&root.review.id, "x", Some(json!(2))))
            .await;
        assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

        let not_found = s
            .service
            .update_review(&s.alice, "other-product", edit(&root.review.id, "x", None))
            .await;
        assert!(matches!(not_found, Err(AppError::NotFound(_))));

        let updated = s
            .service
            .update_review(&s.alice, &s.product_id, edit(&root.review.id, "Good", Some(json!(2))))
            .await
            .unwrap();
        assert_eq!(updated.review.text, "Good");
        assert_eq!(updated.review.rating, Some(2));
        assert!(updated.review.date >= root.review.date);
        assert_eq!(updated.author.name.as_deref(), Some("Alice"));
        assert_eq!(updated.replies.len(), 1);
        assert_eq!(updated.replies[0].review.id, reply.review.id);

        let cleared = s
            .service
            .update_review(&s.alice, &s.product_id, edit(&root.review.id, "Good", Some(json!(""))))
            .await
            .unwrap();
        assert_eq!(cleared.review.rating, None);

        let product = s.db.get_product(&s.product_id).await.unwrap().unwrap();
        assert_eq!(product.rating, None);
        assert_eq!(product.rating_count, 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_recomputes() {
        let s = setup().await;
        let r1 = s
            .service
            .create_review(&s.alice, &s.product_id, review("Good", json!(4), None))
            .await
            .unwrap();
        s.service
            .create_review(&s.bob, &s.product_id, review("Meh", json!(2), None))
            .await
            .unwrap();
        s.service
            .create_reply(
                &s.bob,
                &s.product_id,
                CreateReplyInput {
                    text: "Thanks".to_string(),
                    parent_id: Some(r1.review.id.clone()),
                },
            )
            .await
            .unwrap();

        let forbidden = s.service.delete_review(&s.bob, &s.product_id, &r1.review.id).await;
        assert!(matches!(forbidden, Err(AppError::Forbidden(_))));

        let id = s
            .service
            .delete_review(&s.alice, &s.product_id, &r1.review.id)
            .await
            .unwrap();
        assert_eq!(id, r1.review.id);

        let thread = s.service.list_thread(&s.product_id).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].review.text, "Meh");

        let product = s.db.get_product(&s.product_id).await.unwrap().unwrap();
        assert_eq!(product.rating, Some(2.0));
        assert_eq!(product.rating_count, 1);
    }

    #[tokio::test]
    async fn test_replies_listing_and_depth() {
        let s = setup().await;
        let root = s
            .service
            .create_review(&s.alice, &s.product_id, review("Good", json!(4), None))
            .await
            .unwrap();
        let reply = s
            .service
            .create_reply(
                &s.bob,
                &s.product_id,
                CreateReplyInput {
                    text: "Thanks".to_string(),
                    parent_id: Some(root.review.id.clone()),
                },
            )
            .await
            .unwrap();
        let nested = s
            .service
            .create_reply(
                &s.alice,
                &s.product_id,
                CreateReplyInput {
                    text: "You're welcome".to_string(),
                    parent_id: Some(reply.review.id.clone()),
                },
            )
            .await
            .unwrap();

        bad_request(
            s.service
                .create_reply(
                    &s.bob,
                    &s.product_id,
                    CreateReplyInput {
                        text: "Too deep".to_string(),
                        parent_id: Some(nested.review.id.clone()),
                    },
                )
                .await,
            "Maximum reply depth reached",
        );

        let replies = s
            .service
            .list_replies(&s.product_id, Some(&root.review.id))
            .await
            .unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].replies.len(), 1);
        assert_eq!(replies[0].replies[0].review.id, nested.review.id);

        bad_request(
            s.service.list_replies(&s.product_id, None).await,
            "parentId query parameter is required",
        );
    }

    #[tokio::test]
    async fn test_create_reply_validation() {
        let s = setup().await;
        bad_request(
            s.service
                .create_reply(
                    &s.alice,
                    &s.product_id,
                    CreateReplyInput {
                        text: String::new(),
                        parent_id: Some("x".to_string()),
                    },
                )
                .await,
            "Reply cannot be empty",
        );
        bad_request(
            s.service
                .create_reply(
                    &s.alice,
                    &s.product_id,
                    CreateReplyInput {
                        text: "Hi".to_string(),
                        parent_id: None,
                    },
                )
                .await,
            "parentId is required",
        );
        let missing = s
            .service
            .create_reply(
                &s.alice,
                &s.product_id,
                CreateReplyInput {
                    text: "Hi".to_string(),
                    parent_id: Some("missing".to_string()),
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
