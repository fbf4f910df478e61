//! Error types for the load pipeline.
//!
//! Every error aborts the run: nothing here is caught, retried, or rolled
//! back. Conversion into the top-level [`PokeloadError`] is automatic via
//! `From`, so `?` works across stage boundaries.

use std::path::PathBuf;

use thiserror::Error;

/// Errors while building the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No project id on the command line or in GOOGLE_CLOUD_PROJECT.
    #[error("no project id: pass --project or set GOOGLE_CLOUD_PROJECT")]
    MissingProject,

    /// No access token in BIGQUERY_ACCESS_TOKEN.
    #[error("no access token: set BIGQUERY_ACCESS_TOKEN")]
    MissingToken,
}

/// Errors while reading the source CSV.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input path does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Other read failure.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// File has no header row.
    #[error("input has no header row")]
    EmptyHeader,

    /// Malformed row, typically an inconsistent column count.
    #[error("malformed CSV at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: csv::Error,
    },
}

/// Errors while reshaping the record set.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column required by the transform is absent.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Rename target already names another column.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
}

/// Errors from the BigQuery publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Dataset creation is exists_ok=false: a second create fails.
    #[error("dataset already exists: {0}")]
    DatasetAlreadyExists(String),

    /// Destination table exists and the load disposition is fail, not
    /// overwrite or append.
    #[error("table already exists: {0}")]
    TableAlreadyExists(String),

    /// Record set columns do not line up with the declared schema.
    #[error("schema mismatch: expected column '{expected}' at position {position}, found '{actual}'")]
    SchemaMismatch {
        position: usize,
        expected: String,
        actual: String,
    },

    /// A remote call exceeded its configured bound.
    #[error("timed out during {0}")]
    Timeout(String),

    /// Transport-level failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// BigQuery rejected the request.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to build the CSV bulk-load body.
    #[error("failed to encode load body: {0}")]
    Encode(#[from] csv::Error),
}

/// Top-level error for one run of the loader.
#[derive(Debug, Error)]
pub enum PokeloadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl PokeloadError {
    /// Process exit code per failure class: config 2, input 3, transform 4,
    /// remote conflict 5, timeout 6, anything else 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            PokeloadError::Config(_) => 2,
            PokeloadError::Load(_) => 3,
            PokeloadError::Transform(_) => 4,
            PokeloadError::Publish(
                PublishError::DatasetAlreadyExists(_) | PublishError::TableAlreadyExists(_),
            ) => 5,
            PokeloadError::Publish(PublishError::Timeout(_)) => 6,
            PokeloadError::Publish(_) => 1,
        }
    }
}

/// Result type for one run of the loader.
pub type PokeloadResult<T> = Result<T, PokeloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_failure_class() {
        assert_eq!(PokeloadError::from(ConfigError::MissingProject).exit_code(), 2);
        assert_eq!(
            PokeloadError::from(LoadError::EmptyHeader).exit_code(),
            3
        );
        assert_eq!(
            PokeloadError::from(TransformError::MissingColumn("english_name".into())).exit_code(),
            4
        );
        assert_eq!(
            PokeloadError::from(PublishError::DatasetAlreadyExists("poke_battler_data".into()))
                .exit_code(),
            5
        );
        assert_eq!(
            PokeloadError::from(PublishError::TableAlreadyExists("pokemon".into())).exit_code(),
            5
        );
        assert_eq!(
            PokeloadError::from(PublishError::Timeout("dataset creation".into())).exit_code(),
            6
        );
        assert_eq!(
            PokeloadError::from(PublishError::Api {
                status: 500,
                message: "boom".into()
            })
            .exit_code(),
            1
        );
    }

    #[test]
    fn error_messages_name_the_offender() {
        let err = TransformError::MissingColumn("english_name".into());
        assert!(err.to_string().contains("english_name"));

        let err = PublishError::SchemaMismatch {
            position: 2,
            expected: "name".into(),
            actual: "english_name".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("position 2"));
        assert!(msg.contains("'name'"));
    }
}
