use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use reelytics_core::config::Config;
use reelytics_core::event::{Event, RatingRow};
use reelytics_engine::derive::derive_events;

/// A fully parsed and derived dataset, shared immutably across requests.
///
/// The engine is stateless: every report is recomputed from `events` per
/// request. Replacing the dataset swaps the whole `Arc` so in-flight
/// requests keep the snapshot they started with.
#[derive(Debug)]
pub struct LoadedDataset {
    /// "movielens" for the bundled archive, "upload" for user CSVs.
    pub source: String,
    pub ratings: usize,
    pub users: usize,
    pub movies: usize,
    pub events: Vec<Event>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedDataset {
    pub fn from_ratings(
        source: &str,
        ratings: &[RatingRow],
        users: usize,
        movies: usize,
    ) -> Self {
        let events = derive_events(ratings);
        info!(
            source,
            ratings = ratings.len(),
            events = events.len(),
            "Derived event log"
        );
        Self {
            source: source.to_string(),
            ratings: ratings.len(),
            users,
            movies,
            events,
            loaded_at: Utc::now(),
        }
    }
}

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`]. Cheap to clone behind `Arc`.
pub struct AppState {
    pub config: Arc<Config>,
    dataset: RwLock<Option<Arc<LoadedDataset>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            dataset: RwLock::new(None),
        }
    }

    pub async fn install_dataset(&self, dataset: LoadedDataset) -> Arc<LoadedDataset> {
        let dataset = Arc::new(dataset);
        *self.dataset.write().await = Some(Arc::clone(&dataset));
        dataset
    }

    /// The current dataset snapshot, if one has been loaded.
    pub async fn dataset(&self) -> Option<Arc<LoadedDataset>> {
        self.dataset.read().await.clone()
    }
}
