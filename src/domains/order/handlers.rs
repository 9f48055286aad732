// HTTP handlers for /api/orders and its /api/cart alias

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use super::service::{OrderPayload, OrderService};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;

const NOT_AUTHENTICATED: &str = "Not authenticated";

pub async fn place_order(
    State(state): State<AppState>,
    vc: Vc,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    let Json(payload) = payload?;

    let order = OrderService::from_state(&state).place(user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": order.id, "message": "Order processed successfully" })),
    ))
}

pub async fn list_orders(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Value>> {
    vc.require_user(NOT_AUTHENTICATED)?;
    let orders = OrderService::from_state(&state).list_all().await?;
    Ok(Json(json!({ "data": orders })))
}

pub async fn list_my_orders(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Value>> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    let orders = OrderService::from_state(&state).placed_by(user).await?;
    Ok(Json(json!({ "data": orders })))
}

pub async fn list_received_orders(State(state): State<AppState>, vc: Vc) -> AppResult<Json<Value>> {
    let user = vc.require_user(NOT_AUTHENTICATED)?;
    let orders = OrderService::from_state(&state).received_by(user).await?;
    Ok(Json(json!({ "data": orders })))
}
