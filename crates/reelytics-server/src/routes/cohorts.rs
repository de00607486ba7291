use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use reelytics_core::analytics::CohortGranularity;
use reelytics_engine::cohorts::build_cohorts;

use crate::{error::AppError, routes::require_dataset, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CohortParams {
    pub granularity: Option<String>,
}

/// GET /api/cohorts - retention by first-activity cohort.
pub async fn get_cohorts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CohortParams>,
) -> Result<impl IntoResponse, AppError> {
    let granularity = CohortGranularity::parse(params.granularity.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let dataset = require_dataset(&state).await?;
    let report = build_cohorts(&dataset.events, granularity);

    Ok(Json(json!({ "data": report })))
}
