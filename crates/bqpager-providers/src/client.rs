use std::time::Duration;

use bqpager_types::QueryMeta;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::api::{ErrorEnvelope, Job, JobReference, QueryRequest, QueryResponse};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::source::BigQueryRowSource;

const ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";
const SUBMIT_TIMEOUT_MS: u64 = 10_000;

/// Thin blocking client over the BigQuery v2 REST API.
#[derive(Clone)]
pub struct BigQueryClient {
    http: Client,
    credentials: Credentials,
    location: Option<String>,
}

/// Parameters of one `getQueryResults` call.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ResultsRequest<'a> {
    pub max_results: u32,
    pub page_token: Option<&'a str>,
    pub timeout_ms: Option<u64>,
}

impl BigQueryClient {
    pub fn new(credentials: Credentials, location: Option<String>) -> Result<Self> {
        // Row fetches are never aborted; latency shows up in the progress
        // indicator instead.
        let http = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("bqpager/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            credentials,
            location,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    /// Starts a standard-SQL query job. Rows are read later through the
    /// returned handle.
    pub fn submit_query(&self, text: &str) -> Result<QueryHandle> {
        let url = format!("{}/projects/{}/queries", ENDPOINT, self.project_id());
        let body = QueryRequest {
            query: text.to_string(),
            use_legacy_sql: false,
            max_results: 0,
            timeout_ms: SUBMIT_TIMEOUT_MS,
            location: self.location.clone(),
        };
        let response: QueryResponse = self.send(self.http.post(&url).json(&body))?;
        log_job_errors(&response);

        let Some(job) = response.job_reference.clone() else {
            return Err(Error::Query("response carried no job reference".into()));
        };
        info!(job_id = %job.job_id, complete = response.job_complete, "submitted query");

        Ok(QueryHandle {
            client: self.clone(),
            total_rows: response.total_rows(),
            complete: response.job_complete,
            job,
        })
    }

    pub(crate) fn get_query_results(
        &self,
        job: &JobReference,
        request: ResultsRequest<'_>,
    ) -> Result<QueryResponse> {
        let url = format!(
            "{}/projects/{}/queries/{}",
            ENDPOINT, job.project_id, job.job_id
        );
        let mut params: Vec<(&str, String)> = vec![
            ("maxResults", request.max_results.to_string()),
            ("formatOptions.useInt64Timestamp", "true".to_string()),
        ];
        if let Some(token) = request.page_token {
            params.push(("pageToken", token.to_string()));
        }
        if let Some(timeout_ms) = request.timeout_ms {
            params.push(("timeoutMs", timeout_ms.to_string()));
        }
        if let Some(location) = job.location.as_ref().or(self.location.as_ref()) {
            params.push(("location", location.clone()));
        }
        self.send(self.http.get(&url).query(&params))
    }

    fn get_job(&self, job: &JobReference) -> Result<Job> {
        let url = format!(
            "{}/projects/{}/jobs/{}",
            ENDPOINT, job.project_id, job.job_id
        );
        let mut request = self.http.get(&url);
        if let Some(location) = job.location.as_ref().or(self.location.as_ref()) {
            request = request.query(&[("location", location)]);
        }
        self.send(request)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.credentials.access_token).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// A submitted query job.
pub struct QueryHandle {
    client: BigQueryClient,
    job: JobReference,
    total_rows: u64,
    complete: bool,
}

impl QueryHandle {
    pub fn job(&self) -> &JobReference {
        &self.job
    }

    /// Blocks until the job finishes, polling every `poll_interval`.
    pub fn wait(&mut self, poll_interval: Duration) -> Result<()> {
        while !self.complete {
            let response = self.client.get_query_results(
                &self.job,
                ResultsRequest {
                    max_results: 0,
                    page_token: None,
                    timeout_ms: Some(poll_interval.as_millis() as u64),
                },
            )?;
            log_job_errors(&response);
            self.complete = response.job_complete;
            self.total_rows = response.total_rows();
            debug!(job_id = %self.job.job_id, complete = self.complete, "polled job");
        }
        info!(job_id = %self.job.job_id, total_rows = self.total_rows, "job finished");
        Ok(())
    }

    /// Row count and cache-hit flag of the finished job.
    pub fn metadata(&self) -> Result<QueryMeta> {
        let job = self.client.get_job(&self.job)?;
        if let Some(error) = job.status.as_ref().and_then(|s| s.error_result.as_ref()) {
            return Err(Error::Query(error.describe()));
        }
        Ok(QueryMeta::new(self.total_rows, job.cache_hit()))
    }

    pub fn into_row_source(self, null_marker: impl Into<String>) -> BigQueryRowSource {
        BigQueryRowSource::new(self.client, self.job, null_marker.into())
    }
}

fn log_job_errors(response: &QueryResponse) {
    for error in &response.errors {
        warn!(error = %error.describe(), "job reported an error");
    }
}
