// Report Service Client
// Fetches plagiarism reports and full document texts from the assignment API

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{DocumentPair, PlagiarismReport};
use super::config_store::ApiConfig;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(String),
}

pub struct ReportClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl Default for ReportClient {
    fn default() -> Self {
        Self::new(&ApiConfig::default())
    }
}

impl ReportClient {
    pub fn new(config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.resolved_base_url(),
            access_token: config.resolved_access_token(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn report_url(&self, assignment_id: &str) -> String {
        format!(
            "{}/api/assignments/{}/plagiarism-report/",
            self.base_url, assignment_id
        )
    }

    pub fn documents_url(&self, assignment_id: &str) -> String {
        format!(
            "{}/api/assignments/{}/document-comparison/",
            self.base_url, assignment_id
        )
    }

    pub async fn fetch_report(&self, assignment_id: &str) -> Result<PlagiarismReport, ClientError> {
        let url = self.report_url(assignment_id);
        let report: PlagiarismReport = self.get_json(&url, &[]).await?;
        info!(
            assignment_id,
            comparisons = report.comparisons.len(),
            "[CLIENT] report fetched"
        );
        Ok(report)
    }

    /// Full texts for a pair; `student1` maps to `document1`.
    pub async fn fetch_documents(
        &self,
        assignment_id: &str,
        student1: &str,
        student2: &str,
    ) -> Result<DocumentPair, ClientError> {
        let url = self.documents_url(assignment_id);
        self.get_json(&url, &[("student1", student1), ("student2", student2)])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let mut request = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .query(query);
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let start = Instant::now();
        let response = request.send().await?;
        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url, status = status.as_u16(), latency_ms, "[CLIENT] request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Json(e.to_string()))
    }
}
