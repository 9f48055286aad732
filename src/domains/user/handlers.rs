// HTTP handlers for /api/user

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::service::{AccountService, LoginPayload, RegisterPayload};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::Vc;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let signed_in = AccountService::from_state(&state).register(payload).await?;

    let cookie = state.security.session_cookie(&signed_in.session);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "id": signed_in.user.id, "email": signed_in.user.email })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let signed_in = AccountService::from_state(&state).login(payload).await?;

    let cookie = state.security.session_cookie(&signed_in.session);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "userId": signed_in.user.id })),
    ))
}

pub async fn logout(State(state): State<AppState>, vc: Vc) -> impl IntoResponse {
    if let Some(user_id) = vc.user_id() {
        tracing::info!("User {} signed out", user_id);
    }
    (
        [(header::SET_COOKIE, state.security.logout_cookie())],
        Json(json!({ "message": "Success" })),
    )
}

pub async fn delete_account(
    State(state): State<AppState>,
    vc: Vc,
) -> AppResult<impl IntoResponse> {
    let user = vc.require_user("Not authenticated")?;
    AccountService::from_state(&state).delete_account(&user.id).await?;

    Ok((
        [(header::SET_COOKIE, state.security.logout_cookie())],
        Json(json!({ "message": "Account deleted" })),
    ))
}

pub async fn me(vc: Vc) -> Json<serde_json::Value> {
    Json(json!({ "user": vc.user }))
}
