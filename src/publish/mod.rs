//! BigQuery publisher: dataset creation and the bulk table load.
//!
//! Both operations are strict about pre-existing remote state: creating a
//! dataset that exists fails, and loading into a table that exists fails.
//! Nothing is retried and nothing already created remotely is rolled back.

mod api;

use reqwest::StatusCode;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::PublishError;
use crate::model::{RecordSet, TableSchema};

use api::{
    ApiErrorEnvelope, DatasetInsertRequest, DatasetReference, DatasetResource, Job,
    JobConfiguration, JobConfigurationLoad, JobInsertRequest, TableReference,
};

/// Poll interval while waiting for a load job to finish.
const JOB_POLL_INTERVAL_MS: u64 = 500;

/// Reference to a dataset that this run created.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    pub project_id: String,
    pub dataset_id: String,
    pub location: String,
}

/// Thin client over the BigQuery REST v2 surface.
pub struct BigQueryClient {
    http: reqwest::Client,
    config: Config,
}

impl BigQueryClient {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create the destination dataset, failing if it already exists.
    ///
    /// The call is bounded by `config.dataset_timeout`.
    pub async fn ensure_dataset(&self) -> Result<DatasetHandle, PublishError> {
        let cfg = &self.config;
        let url = format!("{}/projects/{}/datasets", cfg.api_base, cfg.project_id);
        let body = DatasetInsertRequest {
            dataset_reference: DatasetReference {
                project_id: cfg.project_id.clone(),
                dataset_id: cfg.dataset_id.clone(),
            },
            location: cfg.location.clone(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&cfg.access_token)
            .timeout(cfg.dataset_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| timeout_or_http(e, "dataset creation"))?;

        match response.status() {
            StatusCode::CONFLICT => {
                return Err(PublishError::DatasetAlreadyExists(cfg.dataset_id.clone()))
            }
            status if !status.is_success() => return Err(api_error(status, response).await),
            _ => {}
        }

        // The created resource echoes the dataset reference back; reading it
        // keeps the call bounded through the body and confirms the id.
        let created: DatasetResource = response
            .json()
            .await
            .map_err(|e| timeout_or_http(e, "dataset creation"))?;

        let handle = DatasetHandle {
            project_id: created.dataset_reference.project_id,
            dataset_id: created.dataset_reference.dataset_id,
            location: created.location.unwrap_or_else(|| cfg.location.clone()),
        };
        info!(
            dataset = %handle.dataset_id,
            project = %handle.project_id,
            location = %handle.location,
            "created dataset"
        );
        Ok(handle)
    }

    /// Bulk-load the record set into the destination table.
    ///
    /// Columns are checked against the schema client-side first, then the
    /// destination is probed so an existing table fails before any bytes are
    /// uploaded. The whole call, submission plus job polling, is bounded by
    /// `config.load_timeout`.
    pub async fn publish_table(
        &self,
        records: &RecordSet,
        schema: &TableSchema,
    ) -> Result<(), PublishError> {
        check_schema(records, schema)?;

        tokio::time::timeout(self.config.load_timeout, self.load(records, schema))
            .await
            .map_err(|_| PublishError::Timeout("table load".to_string()))?
    }

    async fn load(&self, records: &RecordSet, schema: &TableSchema) -> Result<(), PublishError> {
        let cfg = &self.config;

        // Existence probe: the load disposition is fail, not overwrite.
        let table_url = format!(
            "{}/projects/{}/datasets/{}/tables/{}",
            cfg.api_base, cfg.project_id, cfg.dataset_id, cfg.table_id
        );
        let probe = self
            .http
            .get(&table_url)
            .bearer_auth(&cfg.access_token)
            .send()
            .await?;
        match probe.status() {
            StatusCode::NOT_FOUND => {}
            status if status.is_success() => {
                return Err(PublishError::TableAlreadyExists(cfg.qualified_table()))
            }
            status => return Err(api_error(status, probe).await),
        }

        // Submit the multipart load job: JSON configuration plus a
        // headerless CSV body in one request.
        let job = JobInsertRequest {
            configuration: JobConfiguration {
                load: JobConfigurationLoad {
                    destination_table: TableReference {
                        project_id: cfg.project_id.clone(),
                        dataset_id: cfg.dataset_id.clone(),
                        table_id: cfg.table_id.clone(),
                    },
                    schema: schema.clone(),
                    source_format: "CSV".to_string(),
                    write_disposition: "WRITE_EMPTY".to_string(),
                    create_disposition: "CREATE_IF_NEEDED".to_string(),
                },
            },
        };
        let csv_body = encode_csv(records)?;
        debug!(bytes = csv_body.len(), rows = records.row_count(), "encoded load body");

        let upload_url = format!(
            "{}/projects/{}/jobs?uploadType=multipart",
            cfg.upload_base, cfg.project_id
        );
        let boundary = "pokeload_boundary";
        let body = multipart_related(&job, &csv_body, boundary)?;

        let response = self
            .http
            .post(&upload_url)
            .bearer_auth(&cfg.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }
        let mut job: Job = response.json().await?;

        // Poll until the job reports DONE.
        loop {
            if let Some(status) = &job.status {
                if status.state == "DONE" {
                    match &status.error_result {
                        None => break,
                        Some(err) => return Err(job_error(err, &cfg.qualified_table())),
                    }
                }
            }
            let job_ref = job
                .job_reference
                .clone()
                .ok_or_else(|| PublishError::Api {
                    status: 200,
                    message: "job response carried no job reference".to_string(),
                })?;
            tokio::time::sleep(std::time::Duration::from_millis(JOB_POLL_INTERVAL_MS)).await;

            let mut poll_url = format!(
                "{}/projects/{}/jobs/{}",
                cfg.api_base, cfg.project_id, job_ref.job_id
            );
            if let Some(location) = &job_ref.location {
                poll_url.push_str(&format!("?location={location}"));
            }
            let response = self
                .http
                .get(&poll_url)
                .bearer_auth(&cfg.access_token)
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(api_error(status, response).await);
            }
            job = response.json().await?;
        }

        info!(
            rows = records.row_count(),
            table = %cfg.qualified_table(),
            "loaded record set"
        );
        Ok(())
    }
}

/// Record-set columns must equal the schema field names, in order.
fn check_schema(records: &RecordSet, schema: &TableSchema) -> Result<(), PublishError> {
    let actual = records.column_names();
    let expected = schema.field_names();

    for (position, expected_name) in expected.iter().enumerate() {
        match actual.get(position) {
            Some(name) if name == expected_name => {}
            other => {
                return Err(PublishError::SchemaMismatch {
                    position,
                    expected: expected_name.to_string(),
                    actual: other.unwrap_or(&"<none>").to_string(),
                })
            }
        }
    }
    if actual.len() > expected.len() {
        return Err(PublishError::SchemaMismatch {
            position: expected.len(),
            expected: "<none>".to_string(),
            actual: actual[expected.len()].to_string(),
        });
    }
    Ok(())
}

/// Serialize rows to a headerless CSV body. Column names come from the
/// declared schema, so no header line is sent.
fn encode_csv(records: &RecordSet) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in &records.rows {
        let fields: Vec<String> = row.cells.iter().map(|c| c.display().into_owned()).collect();
        writer.write_record(&fields)?;
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error().into())
}

/// Assemble the two-part multipart/related upload body.
fn multipart_related(
    job: &JobInsertRequest,
    csv_body: &[u8],
    boundary: &str,
) -> Result<Vec<u8>, PublishError> {
    let config_json = serde_json::to_string(job).map_err(|e| PublishError::Api {
        status: 0,
        message: format!("failed to encode job configuration: {e}"),
    })?;

    let mut body = Vec::with_capacity(csv_body.len() + config_json.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(config_json.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: text/csv\r\n\r\n").as_bytes());
    body.extend_from_slice(csv_body);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}

/// Distinguish a request hitting its configured bound from other transport
/// failures.
fn timeout_or_http(e: reqwest::Error, what: &str) -> PublishError {
    if e.is_timeout() {
        PublishError::Timeout(what.to_string())
    } else {
        PublishError::Http(e)
    }
}

/// Map a non-success response to an API error, using the BigQuery error
/// envelope message when the body carries one.
async fn api_error(status: StatusCode, response: reqwest::Response) -> PublishError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    PublishError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Map a terminal job error. A `duplicate` reason means the destination
/// table existed when the load ran.
fn job_error(err: &api::ErrorProto, table: &str) -> PublishError {
    let message = err.message.clone().unwrap_or_else(|| "load job failed".to_string());
    match err.reason.as_deref() {
        Some("duplicate") => PublishError::TableAlreadyExists(table.to_string()),
        _ => PublishError::Api {
            status: 400,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{pokemon_table_schema, CellValue, Column, Field, FieldType};

    fn record_set(names: &[&str]) -> RecordSet {
        let columns = names
            .iter()
            .enumerate()
            .map(|(i, n)| Column::new(*n, i))
            .collect();
        RecordSet::new(columns)
    }

    #[test]
    fn check_schema_accepts_exact_match() {
        let schema = TableSchema::new(vec![
            Field::new("name", FieldType::Text),
            Field::new("hp", FieldType::Int64),
        ]);
        let rs = record_set(&["name", "hp"]);
        assert!(check_schema(&rs, &schema).is_ok());
    }

    #[test]
    fn check_schema_reports_first_divergence() {
        let schema = TableSchema::new(vec![
            Field::new("name", FieldType::Text),
            Field::new("hp", FieldType::Int64),
        ]);
        let rs = record_set(&["name", "attack"]);
        match check_schema(&rs, &schema).unwrap_err() {
            PublishError::SchemaMismatch {
                position,
                expected,
                actual,
            } => {
                assert_eq!(position, 1);
                assert_eq!(expected, "hp");
                assert_eq!(actual, "attack");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn check_schema_rejects_missing_and_extra_columns() {
        let schema = TableSchema::new(vec![
            Field::new("name", FieldType::Text),
            Field::new("hp", FieldType::Int64),
        ]);
        let short = record_set(&["name"]);
        assert!(matches!(
            check_schema(&short, &schema),
            Err(PublishError::SchemaMismatch { position: 1, .. })
        ));
        let long = record_set(&["name", "hp", "extra"]);
        assert!(matches!(
            check_schema(&long, &schema),
            Err(PublishError::SchemaMismatch { position: 2, .. })
        ));
    }

    #[test]
    fn check_schema_against_pokemon_schema() {
        let schema = pokemon_table_schema();
        let names: Vec<&str> = schema.field_names();
        let rs = record_set(&names);
        assert!(check_schema(&rs, &schema).is_ok());
    }

    #[test]
    fn encode_csv_is_headerless_with_empty_nulls() {
        let mut rs = record_set(&["name", "hp", "height_m"]);
        rs.add_row(
            vec!["Bulbasaur".into(), 45i64.into(), CellValue::Null],
            2,
        );
        rs.add_row(vec!["Ivysaur".into(), 60i64.into(), 1.0f64.into()], 3);
        let body = encode_csv(&rs).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "Bulbasaur,45,\nIvysaur,60,1\n"
        );
    }

    #[test]
    fn multipart_body_has_both_parts() {
        let job = JobInsertRequest {
            configuration: JobConfiguration {
                load: JobConfigurationLoad {
                    destination_table: TableReference {
                        project_id: "p".into(),
                        dataset_id: "d".into(),
                        table_id: "t".into(),
                    },
                    schema: pokemon_table_schema(),
                    source_format: "CSV".into(),
                    write_disposition: "WRITE_EMPTY".into(),
                    create_disposition: "CREATE_IF_NEEDED".into(),
                },
            },
        };
        let body = multipart_related(&job, b"a,b\n", "xyz").unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("--xyz\r\n"));
        assert!(text.contains("application/json"));
        assert!(text.contains("text/csv"));
        assert!(text.ends_with("--xyz--\r\n"));
    }
}
