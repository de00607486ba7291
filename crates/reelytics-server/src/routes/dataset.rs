use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde_json::json;

use reelytics_engine::dataset::{ensure_movielens, load_dataset, parse_ratings_csv};

use crate::{
    error::AppError,
    state::{AppState, LoadedDataset},
};

fn summary_json(dataset: &LoadedDataset) -> serde_json::Value {
    json!({
        "data": {
            "source": dataset.source,
            "ratings": dataset.ratings,
            "users": dataset.users,
            "movies": dataset.movies,
            "events": dataset.events.len(),
            "loaded_at": dataset.loaded_at.to_rfc3339(),
        }
    })
}

/// POST /api/dataset/load - fetch (if needed) and load the bundled archive.
///
/// Idempotent end to end: the engine skips the download when the normalized
/// CSVs already exist, and re-deriving from the same tables yields the same
/// event log.
pub async fn load(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let data_dir = Path::new(&state.config.data_dir).to_path_buf();

    ensure_movielens(&data_dir, &state.config.dataset_url)
        .await
        .map_err(|e| AppError::DatasetFetch(e.to_string()))?;

    let tables = load_dataset(&data_dir).map_err(AppError::Internal)?;
    let dataset = state
        .install_dataset(LoadedDataset::from_ratings(
            "movielens",
            &tables.ratings,
            tables.users.len(),
            tables.movies.len(),
        ))
        .await;

    Ok(Json(summary_json(&dataset)))
}

/// POST /api/dataset/upload - build the dataset from a user-supplied ratings
/// CSV (`userId,movieId,rating,timestamp`). Dimension tables are synthesized
/// from the distinct ids, as there is nothing else to know about them.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is empty".to_string()));
    }

    let ratings =
        parse_ratings_csv(&body).map_err(|e| AppError::BadRequest(format!("invalid CSV: {e}")))?;

    let users: HashSet<u32> = ratings.iter().map(|r| r.user_id).collect();
    let movies: HashSet<u32> = ratings.iter().map(|r| r.item_id).collect();

    let dataset = state
        .install_dataset(LoadedDataset::from_ratings(
            "upload",
            &ratings,
            users.len(),
            movies.len(),
        ))
        .await;

    Ok(Json(summary_json(&dataset)))
}
