use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use reelytics_server::state::{AppState, LoadedDataset};

#[tokio::main]
async fn main() -> Result<()> {
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    let cfg = reelytics_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    std::fs::create_dir_all(&cfg.data_dir)?;

    let state = Arc::new(AppState::new(cfg.clone()));

    // Load local CSVs at startup when present. A missing dataset is a
    // warning, not a failure; the first POST /api/dataset/load fetches it.
    let data_dir = Path::new(&cfg.data_dir);
    if cfg.preload && reelytics_engine::dataset::dataset_present(data_dir) {
        match reelytics_engine::dataset::load_dataset(data_dir) {
            Ok(tables) => {
                let dataset = state
                    .install_dataset(LoadedDataset::from_ratings(
                        "movielens",
                        &tables.ratings,
                        tables.users.len(),
                        tables.movies.len(),
                    ))
                    .await;
                info!(
                    ratings = dataset.ratings,
                    events = dataset.events.len(),
                    "Dataset preloaded from local CSVs"
                );
            }
            Err(e) => tracing::warn!(error = %e, "Could not preload local dataset"),
        }
    } else {
        tracing::warn!(
            data_dir = %cfg.data_dir,
            "No local dataset found. POST /api/dataset/load to fetch MovieLens, \
             or /api/dataset/upload to provide a ratings CSV."
        );
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = reelytics_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "reelytics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
