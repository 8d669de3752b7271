//! HTTP client for the remote run endpoint.
//!
//! Implements the `SyncGateway` port over `POST /runs/batch` and exposes the
//! paginated `GET /runs` listing used for connectivity testing. All requests
//! carry `Accept: application/json` and bearer auth as default headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use stride_core::{GatewayError, SyncGateway};
use stride_domain::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RUNS_PER_PAGE};
use stride_domain::{
    ApiEnvelope, BatchRunData, BatchRunRequest, Paginated, Result, RunSummary, ServerCredentials,
    StrideError,
};
use tracing::{debug, info, instrument, warn};

/// Configuration for the run API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the server, without a trailing slash.
    pub base_url: String,
    /// Bearer token injected on every request.
    pub token: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn from_credentials(credentials: &ServerCredentials) -> Self {
        Self {
            base_url: credentials.base_url.clone(),
            token: credentials.token.clone(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Run API client
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// underlying HTTP client cannot be constructed.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| StrideError::Auth(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StrideError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    /// List runs stored on the server, one page at a time.
    #[instrument(skip(self))]
    pub async fn list_runs(
        &self,
        page: u32,
        per_page: u32,
    ) -> std::result::Result<Paginated<Vec<RunSummary>>, GatewayError> {
        let url = format!("{}/runs", self.base_url);
        debug!(url = %url, page, per_page, "listing runs");

        let response = self
            .http
            .get(&url)
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        response.json().await.map_err(|e| GatewayError::Network(format!("invalid listing body: {e}")))
    }

    /// Validate the stored credentials by fetching the first listing page.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> std::result::Result<(), GatewayError> {
        self.list_runs(1, DEFAULT_RUNS_PER_PAGE).await?;
        info!("server connection verified");
        Ok(())
    }
}

#[async_trait]
impl SyncGateway for ApiClient {
    #[instrument(skip_all, fields(runs = request.runs.len()))]
    async fn upload_batch(
        &self,
        request: &BatchRunRequest,
    ) -> std::result::Result<BatchRunData, GatewayError> {
        let url = format!("{}/runs/batch", self.base_url);
        debug!(url = %url, "uploading run batch");

        let response =
            self.http.post(&url).json(request).send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "batch upload rejected");
            return Err(map_status_error(status));
        }

        let envelope: ApiEnvelope<BatchRunData> = response
            .json()
            .await
            .map_err(|e| GatewayError::Network(format!("invalid batch response body: {e}")))?;

        info!(
            created = envelope.data.created,
            skipped = envelope.data.skipped,
            "run batch accepted"
        );
        Ok(envelope.data)
    }
}

fn map_status_error(status: StatusCode) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
        StatusCode::UNPROCESSABLE_ENTITY => GatewayError::Validation,
        other => GatewayError::Http(other.as_u16()),
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Network(err.to_string())
}
