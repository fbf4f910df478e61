//! Run configuration for the loader

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default BigQuery REST surface. Overridable through BIGQUERY_API_BASE so
/// tests can point the client at a local mock server.
pub const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Default upload surface for multipart load jobs, derived from the API base
/// when not set explicitly.
pub const DEFAULT_UPLOAD_BASE: &str = "https://bigquery.googleapis.com/upload/bigquery/v2";

/// Everything one run needs: input path, destination coordinates, and the
/// remote-call bounds.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the source CSV
    pub csv_path: PathBuf,
    /// Google Cloud project id
    pub project_id: String,
    /// Destination dataset id
    pub dataset_id: String,
    /// Destination table id (unqualified)
    pub table_id: String,
    /// Geographic location tag for the dataset
    pub location: String,
    /// Bound on the dataset-creation call
    pub dataset_timeout: Duration,
    /// Bound on the whole table load, submission plus polling
    pub load_timeout: Duration,
    /// REST API base
    pub api_base: String,
    /// Upload base for multipart load jobs
    pub upload_base: String,
    /// OAuth bearer token
    pub access_token: String,
}

impl Config {
    /// Assemble a config from CLI-provided values and the environment.
    ///
    /// `project` falls back to GOOGLE_CLOUD_PROJECT; the access token always
    /// comes from BIGQUERY_ACCESS_TOKEN. A `.env` file is honored if
    /// present.
    pub fn from_env(
        csv_path: PathBuf,
        project: Option<String>,
        dataset_id: String,
        table_id: String,
        location: String,
        dataset_timeout_secs: u64,
        load_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let project_id = project
            .or_else(|| std::env::var("GOOGLE_CLOUD_PROJECT").ok())
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingProject)?;

        let access_token = std::env::var("BIGQUERY_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let api_base = std::env::var("BIGQUERY_API_BASE")
            .ok()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        // When the API base is overridden the same server handles uploads.
        let upload_base = if api_base == DEFAULT_API_BASE {
            DEFAULT_UPLOAD_BASE.to_string()
        } else {
            api_base.clone()
        };

        Ok(Self {
            csv_path,
            project_id,
            dataset_id,
            table_id,
            location,
            dataset_timeout: Duration::from_secs(dataset_timeout_secs),
            load_timeout: Duration::from_secs(load_timeout_secs),
            api_base,
            upload_base,
            access_token,
        })
    }

    /// Fully-qualified table identifier, `dataset.table`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.dataset_id, self.table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            csv_path: PathBuf::from("pokemon.csv"),
            project_id: "test-project".into(),
            dataset_id: "poke_battler_data".into(),
            table_id: "pokemon".into(),
            location: "US".into(),
            dataset_timeout: Duration::from_secs(30),
            load_timeout: Duration::from_secs(300),
            api_base: DEFAULT_API_BASE.into(),
            upload_base: DEFAULT_UPLOAD_BASE.into(),
            access_token: "tok".into(),
        }
    }

    #[test]
    fn qualified_table_joins_dataset_and_table() {
        assert_eq!(base_config().qualified_table(), "poke_battler_data.pokemon");
    }
}
