//! HTTP transport for the check-host.net API

use crate::{
    error::{AppError, ErrorContext, Result},
    models::{CheckJob, JobHandle, RawResults},
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// The two remote calls a check needs, abstracted for testing
#[async_trait]
pub trait CheckTransport: Send + Sync {
    /// Start a check and return the service's job handle
    async fn submit(&self, job: &CheckJob) -> Result<JobHandle>;

    /// Fetch the current per-node results for a submitted job
    async fn fetch_results(&self, request_id: &str) -> Result<RawResults>;
}

/// Submission reply; the service sets `error` instead of `request_id` on refusal
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    request_id: Option<String>,
    #[serde(default)]
    permanent_link: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// reqwest-backed check-host.net client
pub struct CheckHostClient {
    client: Client,
    base_url: String,
}

impl CheckHostClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(base_url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::config(format!("API base URL must use http or https: {}", base_url)));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("check-host-tester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &crate::models::Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::transport(format!("{} returned HTTP {}", url, status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::transport(format!("undecodable response from {}: {}", url, e)))
    }
}

#[async_trait]
impl CheckTransport for CheckHostClient {
    async fn submit(&self, job: &CheckJob) -> Result<JobHandle> {
        if job.requested_nodes().is_empty() {
            return Err(AppError::invalid_request("Node selection is empty"));
        }

        let url = format!("{}/check-{}", self.base_url, job.check_type().as_str());
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(job.node_count() + 1);
        query.push(("host", job.target_host()));
        query.extend(job.requested_nodes().iter().map(|node| ("node", node.as_str())));

        let body = self.get_json(&url, &query).await.context("Check submission failed")?;
        let reply: SubmitResponse = serde_json::from_value(body)
            .map_err(|e| AppError::transport(format!("malformed submission reply: {}", e)))?;

        match reply.request_id {
            Some(request_id) if !request_id.is_empty() => {
                let permanent_link = reply
                    .permanent_link
                    .unwrap_or_else(|| format!("{}/check-report/{}", self.base_url, request_id));
                Ok(JobHandle {
                    request_id,
                    permanent_link,
                })
            }
            _ => Err(AppError::transport(match reply.error {
                Some(error) => format!("service refused the check: {}", error),
                None => "submission reply has no request_id".to_string(),
            })),
        }
    }

    async fn fetch_results(&self, request_id: &str) -> Result<RawResults> {
        let url = format!("{}/check-result/{}", self.base_url, request_id);
        let body = self.get_json(&url, &[]).await?;
        RawResults::from_value(body).map_err(|e| AppError::transport(e.to_string()))
    }
}
