use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use reelytics_core::experiment::ExperimentParams;
use reelytics_engine::experiment::run_experiment;

use crate::{error::AppError, routes::require_dataset, state::AppState};

/// POST /api/experiment - run the A/B-test simulator.
///
/// The JSON body may set any subset of [`ExperimentParams`]; omitted fields
/// take their documented defaults, so `{}` runs the standard 7-day / 12%
/// lift simulation.
pub async fn run(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ExperimentParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let dataset = require_dataset(&state).await?;
    let report = run_experiment(&dataset.events, &params).map_err(AppError::from_engine)?;

    Ok(Json(json!({ "data": report })))
}
