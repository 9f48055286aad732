use axum::{
    extract::{Path as AxumPath, State},
    response::Json,
};

use super::service::{ProfessionalProfile, ProfessionalService};
use crate::app_state::AppState;
use crate::error::AppResult;

pub async fn get_professional(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> AppResult<Json<ProfessionalProfile>> {
    Ok(Json(ProfessionalService::from_state(&state).profile(&id).await?))
}
