// HTTP handlers for /api/product

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use super::service::{ProductDetail, ProductPayload, ProductService};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;
use crate::models::Product;

const NOT_AUTHENTICATED: &str = "Not authenticated";

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(ProductService::from_state(&state).list().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    AxumPath(slug): AxumPath<String>,
) -> AppResult<Json<ProductDetail>> {
    Ok(Json(ProductService::from_state(&state).detail(&slug).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    vc: Vc,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    let Json(payload) = payload?;

    let product = ProductService::from_state(&state).create(user, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_user_products(
    State(state): State<AppState>,
    vc: Vc,
) -> AppResult<Json<Vec<Product>>> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    Ok(Json(ProductService::from_state(&state).list_for_user(user).await?))
}

pub async fn update_user_product(
    State(state): State<AppState>,
    vc: Vc,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    let Json(payload) = payload?;

    Ok(Json(ProductService::from_state(&state).update(user, payload).await?))
}

pub async fn delete_user_product(
    State(state): State<AppState>,
    vc: Vc,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    let Json(payload) = payload?;

    let id = ProductService::from_state(&state).delete(user, payload).await?;
    Ok(Json(json!({ "id": id })))
}
