//! Serde types for the slice of the BigQuery REST v2 surface the loader uses

use serde::{Deserialize, Serialize};

use crate::model::TableSchema;

/// Body for `datasets.insert`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInsertRequest {
    pub dataset_reference: DatasetReference,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    pub project_id: String,
    pub dataset_id: String,
}

/// Subset of the `Dataset` resource returned by `datasets.insert`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetResource {
    pub dataset_reference: DatasetReference,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

/// Job envelope for `jobs.insert`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInsertRequest {
    pub configuration: JobConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    pub load: JobConfigurationLoad,
}

/// Load configuration: explicit schema, CSV source, fail if non-empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationLoad {
    pub destination_table: TableReference,
    pub schema: TableSchema,
    pub source_format: String,
    pub write_disposition: String,
    pub create_disposition: String,
}

/// Subset of the `Job` resource returned by insert and get
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_reference: Option<JobReference>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: String,
    #[serde(default)]
    pub error_result: Option<ErrorProto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// BigQuery error envelope, `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
}
