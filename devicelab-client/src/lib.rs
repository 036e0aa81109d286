//! Devicelab Executor Client
//!
//! A small, type-safe HTTP client for the device-lab executor service.
//!
//! One `ExecutorClient` is built per step run and reused for every call in
//! that run: job submission, status polling, log and report retrieval, and
//! the scriptless subsystem. The credential headers are computed once at
//! construction and attached to every request.
//!
//! # Example
//!
//! ```no_run
//! use devicelab_client::{Credentials, ExecutorClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let executor = Credentials::new("ci-bot", "s3cret");
//!     let client = ExecutorClient::new("http://localhost:4545", &executor, None)?;
//!
//!     let info = client.job_status("job-1").await?;
//!     println!("job {} is {}", info.id, info.status);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
mod jobs;
mod scriptless;

// Re-export commonly used types
pub use api::ExecutorApi;
pub use error::{ClientError, Result};
pub use scriptless::SCRIPTLESS_REPORT_FILENAME;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

/// Header carrying the upstream device-cloud credential pair, for executor
/// deployments that proxy to a device cloud with its own account.
pub const DEVICE_CLOUD_AUTH_HEADER: &str = "x-device-cloud-authorization";

/// A username/password pair used for a `Basic` authorization header
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Render the `Basic base64(username:password)` header value
    fn basic_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

/// HTTP client for the device-lab executor API
///
/// Methods are grouped by concern:
/// - Job lifecycle (submit, status, logs, report URL)
/// - Scriptless automation (status, report download)
#[derive(Debug, Clone)]
pub struct ExecutorClient {
    /// Base URL of the executor (e.g., "http://localhost:4545")
    base_url: String,
    /// HTTP client instance carrying the shared credential headers
    client: Client,
}

impl ExecutorClient {
    /// Create a new executor client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the executor API
    /// * `executor` - Credentials for the executor service itself
    /// * `device_cloud` - Optional upstream device-cloud credentials; when
    ///   present they are attached to every request as an additional header
    pub fn new(
        base_url: impl Into<String>,
        executor: &Credentials,
        device_cloud: Option<&Credentials>,
    ) -> Result<Self> {
        let base_url = base_url.into();

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, sensitive_header(&executor.basic_header())?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cloud) = device_cloud {
            headers.insert(DEVICE_CLOUD_AUTH_HEADER, sensitive_header(&cloud.basic_header())?);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Get the base URL of the executor
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the request
    /// failed, or deserializes the response body if successful.
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is a raw string (job id, log text,
    /// report URL)
    pub(crate) async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let response = Self::check_status(response).await?;

        Ok(response.text().await?)
    }

    /// Turn a non-2xx response into an `ApiError`, keeping the body as the
    /// error message
    pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

/// Build a header value that is never logged by middleware
fn sensitive_header(value: &str) -> Result<HeaderValue> {
    let mut hv = HeaderValue::from_str(value)
        .map_err(|e| ClientError::InvalidCredentials(e.to_string()))?;
    hv.set_sensitive(true);
    Ok(hv)
}
