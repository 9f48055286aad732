// HTTP handlers for /api/product/{slug}/reviews

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::input::{CreateReplyInput, CreateReviewInput, ReviewPayload, UpdateReviewInput};
use super::service::ReviewService;
use super::thread::ReviewNode;
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;

#[derive(Debug, Deserialize)]
pub struct RepliesQuery {
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
) -> AppResult<Json<Vec<ReviewNode>>> {
    let thread = ReviewService::from_state(&state).list_thread(&slug).await?;
    Ok(Json(thread))
}

pub async fn create_review(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(slug): AxumPath<String>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReviewNode>)> {
    let user = vc.require_user("You need to be signed in to comment")?;
    let Json(payload) = payload?;

    let node = ReviewService::from_state(&state)
        .create_review(user, &slug, CreateReviewInput::from(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn update_review(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(slug): AxumPath<String>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> AppResult<Json<ReviewNode>> {
    let user = vc.require_user("You need to be signed in to edit a comment")?;
    let Json(payload) = payload?;

    let node = ReviewService::from_state(&state)
        .update_review(user, &slug, UpdateReviewInput::from(payload))
        .await?;
    Ok(Json(node))
}

pub async fn delete_review(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(slug): AxumPath<String>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let user = vc.require_user("You need to be signed in to delete a comment")?;
    let Json(payload) = payload?;
    let id = UpdateReviewInput::from(payload).id;

    let deleted = ReviewService::from_state(&state)
        .delete_review(user, &slug, &id)
        .await?;
    Ok(Json(json!({ "id": deleted })))
}

pub async fn list_replies(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
    Query(query): Query<RepliesQuery>,
) -> AppResult<Json<Vec<ReviewNode>>> {
    let replies = ReviewService::from_state(&state)
        .list_replies(&slug, query.parent_id.as_deref())
        .await?;
    Ok(Json(replies))
}

pub async fn create_reply(
    State(state): State<AppState>,
    vc: Vc,
    AxumPath(slug): AxumPath<String>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReviewNode>)> {
    let user = vc.require_user("You need to be signed in to reply")?;
    let Json(payload) = payload?;

    let node = ReviewService::from_state(&state)
        .create_reply(user, &slug, CreateReplyInput::from(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(node)))
}
