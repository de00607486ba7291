use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use reelytics_engine::kpis::product_kpis;

use crate::{error::AppError, routes::require_dataset, state::AppState};

/// GET /api/kpis - DAU, MAU proxy ratio, and daily event volume.
pub async fn get_kpis(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let dataset = require_dataset(&state).await?;
    let summary = product_kpis(&dataset.events).map_err(AppError::from_engine)?;

    Ok(Json(json!({ "data": summary })))
}
