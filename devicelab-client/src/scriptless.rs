//! Scriptless automation endpoints

use std::path::Path;

use devicelab_core::domain::scriptless::ScriptlessStatus;
use tracing::debug;

use crate::ExecutorClient;
use crate::error::Result;

/// File name the executor publishes the scriptless report under, and the
/// name the step writes into the deploy directory.
pub const SCRIPTLESS_REPORT_FILENAME: &str = "scriptless-report.html";

impl ExecutorClient {
    /// Get the current status snapshot of the scriptless subsystem
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    pub async fn scriptless_status(&self, job_id: &str) -> Result<ScriptlessStatus> {
        let url = format!("{}/jobs/{}/scriptless/status", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Download the scriptless HTML report for a job
    ///
    /// Fetches `{base}/{job_id}/scriptless-report.html` and writes the body
    /// verbatim to `dest`.
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    /// * `dest` - Destination path, typically inside the deploy directory
    pub async fn download_scriptless_report(&self, job_id: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}/{}", self.base_url, job_id, SCRIPTLESS_REPORT_FILENAME);
        debug!("downloading scriptless report from {}", url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response).await?;

        let body = response.bytes().await?;
        tokio::fs::write(dest, &body).await?;

        Ok(())
    }
}
