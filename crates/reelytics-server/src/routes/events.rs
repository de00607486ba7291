use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, routes::require_dataset, state::AppState};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    pub limit: Option<usize>,
}

/// GET /api/events - head of the derived event log, for inspection.
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = clamp_limit(params.limit)?;
    let dataset = require_dataset(&state).await?;

    let sample: Vec<_> = dataset.events.iter().take(limit).collect();
    Ok(Json(json!({
        "data": {
            "total": dataset.events.len(),
            "events": sample,
        }
    })))
}

fn clamp_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(0) => Err(AppError::BadRequest("limit must be >= 1".to_string())),
        Some(n) => Ok(n.min(MAX_LIMIT)),
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_limit, DEFAULT_LIMIT, MAX_LIMIT};

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None).ok(), Some(DEFAULT_LIMIT));
        assert_eq!(clamp_limit(Some(50)).ok(), Some(50));
        assert_eq!(clamp_limit(Some(10_000)).ok(), Some(MAX_LIMIT));
        assert!(clamp_limit(Some(0)).is_err());
    }
}
