#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    /// Source archive for the bundled dataset. Overridable for mirrors/tests.
    pub dataset_url: String,
    /// Load the local dataset at startup when the CSVs already exist.
    pub preload: bool,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("REELYTICS_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("REELYTICS_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            dataset_url: std::env::var("REELYTICS_DATASET_URL").unwrap_or_else(|_| {
                "https://files.grouplens.org/datasets/movielens/ml-1m.zip".to_string()
            }),
            preload: std::env::var("REELYTICS_PRELOAD")
                .map(|v| v == "true")
                .unwrap_or(true),
            cors_origins: std::env::var("REELYTICS_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}
