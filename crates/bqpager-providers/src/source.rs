use std::collections::VecDeque;

use bqpager_engine::{Batch, RowSource, SourceError};
use bqpager_types::{Row, Schema};
use tracing::debug;

use crate::api::{JobReference, QueryResponse, TableFieldSchema};
use crate::client::{BigQueryClient, ResultsRequest};
use crate::error::Result;
use crate::value::render_row;

/// One `getQueryResults` round trip for a finished job.
pub trait ResultPages: Send {
    fn results_page(
        &mut self,
        job: &JobReference,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<QueryResponse>;
}

impl ResultPages for BigQueryClient {
    fn results_page(
        &mut self,
        job: &JobReference,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<QueryResponse> {
        self.get_query_results(
            job,
            ResultsRequest {
                max_results,
                page_token,
                timeout_ms: None,
            },
        )
    }
}

/// Forward-only reader over a finished job's result pages.
///
/// BigQuery pages do not line up with pager pages, so rows are buffered and
/// `next(n)` returns exactly `n` rows until the tail.
pub struct BigQueryRowSource<P = BigQueryClient> {
    pages: P,
    job: JobReference,
    null_marker: String,
    buffer: VecDeque<Row>,
    page_token: Option<String>,
    started: bool,
    fields: Vec<TableFieldSchema>,
    schema: Option<Schema>,
}

impl<P: ResultPages> BigQueryRowSource<P> {
    pub fn new(pages: P, job: JobReference, null_marker: String) -> Self {
        Self {
            pages,
            job,
            null_marker,
            buffer: VecDeque::new(),
            page_token: None,
            started: false,
            fields: Vec::new(),
            schema: None,
        }
    }

    fn has_more_remote(&self) -> bool {
        !self.started || self.page_token.is_some()
    }

    fn fill(&mut self, wanted: usize) -> Result<()> {
        let max_results = u32::try_from(wanted).unwrap_or(u32::MAX);
        let response = self
            .pages
            .results_page(&self.job, max_results, self.page_token.as_deref())?;

        if self.schema.is_none()
            && let Some(table_schema) = &response.schema
        {
            self.fields = table_schema.fields.clone();
            self.schema = Some(table_schema.to_schema());
        }

        let rows = response
            .rows
            .iter()
            .map(|row| render_row(row, &self.fields, &self.null_marker));
        self.buffer.extend(rows);
        self.page_token = response.page_token;
        self.started = true;
        debug!(
            buffered = self.buffer.len(),
            more = self.page_token.is_some(),
            "read result page"
        );
        Ok(())
    }
}

impl<P: ResultPages> RowSource for BigQueryRowSource<P> {
    fn next(&mut self, n: usize) -> std::result::Result<Batch, SourceError> {
        while self.buffer.len() < n && self.has_more_remote() {
            self.fill(n - self.buffer.len())?;
        }
        let take = n.min(self.buffer.len());
        let rows: Vec<Row> = self.buffer.drain(..take).collect();
        let exhausted = self.buffer.is_empty() && !self.has_more_remote();
        Ok(Batch::new(rows, exhausted))
    }

    fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Serves prepared responses in order and records what was asked for.
    #[derive(Default)]
    struct CannedPages {
        responses: VecDeque<QueryResponse>,
        requests: Vec<(u32, Option<String>)>,
    }

    impl CannedPages {
        fn with(responses: Vec<QueryResponse>) -> Self {
            Self {
                responses: responses.into(),
                requests: Vec::new(),
            }
        }
    }

    impl ResultPages for CannedPages {
        fn results_page(
            &mut self,
            _job: &JobReference,
            max_results: u32,
            page_token: Option<&str>,
        ) -> Result<QueryResponse> {
            let token = page_token.map(str::to_string);
            self.requests.push((max_results, token));
            Ok(self.responses.pop_front().unwrap_or_default())
        }
    }

    fn response(first: usize, count: usize, token: Option<&str>, column: &str) -> QueryResponse {
        let rows: Vec<_> = (first..first + count)
            .map(|i| json!({"f": [{"v": i.to_string()}]}))
            .collect();
        serde_json::from_value(json!({
            "jobComplete": true,
            "schema": {"fields": [{"name": column, "type": "INTEGER", "mode": "REQUIRED"}]},
            "rows": rows,
            "pageToken": token,
        }))
        .unwrap()
    }

    fn source(responses: Vec<QueryResponse>) -> BigQueryRowSource<CannedPages> {
        let job = JobReference {
            project_id: "demo".to_string(),
            job_id: "job_1".to_string(),
            location: None,
        };
        BigQueryRowSource::new(CannedPages::with(responses), job, "NULL".to_string())
    }

    fn values(batch: &Batch) -> Vec<String> {
        batch.rows.iter().map(|row| row[0].clone()).collect()
    }

    fn range(from: usize, to: usize) -> Vec<String> {
        (from..to).map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_uneven_remote_pages_regrouped_into_full_batches() {
        let mut source = source(vec![
            response(0, 7, Some("t1"), "id"),
            response(7, 7, Some("t2"), "other"),
            response(14, 7, None, "other"),
        ]);

        let first = source.next(10).unwrap();
        assert_eq!(values(&first), range(0, 10));
        assert!(!first.exhausted);

        let second = source.next(10).unwrap();
        assert_eq!(values(&second), range(10, 20));
        assert!(!second.exhausted);

        let tail = source.next(10).unwrap();
        assert_eq!(values(&tail), range(20, 21));
        assert!(tail.exhausted);

        assert_eq!(
            source.pages.requests,
            vec![
                (10, None),
                (3, Some("t1".to_string())),
                (6, Some("t2".to_string())),
            ]
        );
    }

    #[test]
    fn test_schema_captured_from_first_response_only() {
        let mut source = source(vec![
            response(0, 7, Some("t1"), "id"),
            response(7, 7, None, "other"),
        ]);
        assert!(source.schema().is_none());

        source.next(10).unwrap();
        let schema = source.schema().unwrap();
        assert_eq!(schema.fields()[0].name, "id");
        assert!(schema.fields()[0].required);
    }

    #[test]
    fn test_tail_on_token_boundary_ends_with_empty_batch() {
        let mut source = source(vec![
            response(0, 10, Some("t1"), "id"),
            response(10, 10, Some("t2"), "id"),
            response(20, 0, None, "id"),
        ]);

        let first = source.next(10).unwrap();
        assert_eq!(first.rows.len(), 10);
        assert!(!first.exhausted);

        let second = source.next(10).unwrap();
        assert_eq!(values(&second), range(10, 20));
        assert!(!second.exhausted);

        let last = source.next(10).unwrap();
        assert!(last.is_empty());
        assert!(last.exhausted);
        assert_eq!(source.pages.requests.len(), 3);
    }

    #[test]
    fn test_empty_first_response_is_exhausted_with_schema() {
        let mut source = source(vec![response(0, 0, None, "id")]);

        let batch = source.next(30).unwrap();
        assert!(batch.is_empty());
        assert!(batch.exhausted);
        assert_eq!(source.schema().map(Schema::len), Some(1));

        // Nothing left remotely, so no further requests are made.
        let again = source.next(30).unwrap();
        assert!(again.is_empty());
        assert_eq!(source.pages.requests.len(), 1);
    }
}
