use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use reelytics_core::analytics::FunnelThresholds;
use reelytics_engine::funnel::build_funnel;

use crate::{error::AppError, routes::require_dataset, state::AppState};

/// Threshold overrides. The step definitions are product heuristics, so the
/// API lets callers tune them without a redeploy.
#[derive(Debug, Deserialize)]
pub struct FunnelParams {
    pub activation_min_views: Option<u32>,
    pub activation_window_days: Option<f64>,
    pub week1_start_days: Option<f64>,
    pub week1_end_days: Option<f64>,
}

fn resolve_thresholds(params: &FunnelParams) -> Result<FunnelThresholds, AppError> {
    let defaults = FunnelThresholds::default();
    let thresholds = FunnelThresholds {
        activation_min_views: params
            .activation_min_views
            .unwrap_or(defaults.activation_min_views),
        activation_window_days: params
            .activation_window_days
            .unwrap_or(defaults.activation_window_days),
        week1_start_days: params.week1_start_days.unwrap_or(defaults.week1_start_days),
        week1_end_days: params.week1_end_days.unwrap_or(defaults.week1_end_days),
    };

    if thresholds.activation_min_views == 0 {
        return Err(AppError::BadRequest(
            "activation_min_views must be >= 1".to_string(),
        ));
    }
    if thresholds.activation_window_days <= 0.0 {
        return Err(AppError::BadRequest(
            "activation_window_days must be > 0".to_string(),
        ));
    }
    if thresholds.week1_start_days < 0.0 || thresholds.week1_end_days <= thresholds.week1_start_days
    {
        return Err(AppError::BadRequest(
            "week1 window must satisfy 0 <= start < end".to_string(),
        ));
    }
    Ok(thresholds)
}

/// GET /api/funnel - the three-step activation funnel.
pub async fn get_funnel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FunnelParams>,
) -> Result<impl IntoResponse, AppError> {
    let thresholds = resolve_thresholds(&params)?;
    let dataset = require_dataset(&state).await?;
    let report = build_funnel(&dataset.events, &thresholds);

    Ok(Json(json!({ "data": report })))
}
