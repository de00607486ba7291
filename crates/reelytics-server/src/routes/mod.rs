pub mod cohorts;
pub mod dataset;
pub mod events;
pub mod experiment;
pub mod funnel;
pub mod health;
pub mod kpis;

use std::sync::Arc;

use crate::{error::AppError, state::AppState};

/// Fetch the current dataset snapshot or fail with 404. Every analytics and
/// experiment route goes through this.
pub(crate) async fn require_dataset(
    state: &Arc<AppState>,
) -> Result<Arc<crate::state::LoadedDataset>, AppError> {
    state.dataset().await.ok_or_else(|| {
        AppError::NotFound(
            "no dataset loaded; POST /api/dataset/load or /api/dataset/upload first".to_string(),
        )
    })
}
