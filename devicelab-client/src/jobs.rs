//! Job-related API endpoints

use devicelab_core::domain::job::{JobInfo, LogType};
use devicelab_core::dto::submit::SubmitRequest;
use tracing::debug;

use crate::ExecutorClient;
use crate::error::Result;

impl ExecutorClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a new job to the executor
    ///
    /// # Arguments
    /// * `req` - The job submission payload
    ///
    /// # Returns
    /// The opaque job identifier. Every subsequent polling and download URL
    /// for this run is derived from it.
    pub async fn submit(&self, req: &SubmitRequest) -> Result<String> {
        let url = format!("{}/submit", self.base_url);
        debug!("submitting job to {}", url);
        let response = self.client.post(&url).json(req).send().await?;

        // The executor answers with the bare job id, not JSON.
        let job_id = self.handle_text_response(response).await?;
        Ok(job_id.trim().to_string())
    }

    /// Get the current status snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - The job identifier returned by [`submit`](Self::submit)
    pub async fn job_status(&self, job_id: &str) -> Result<JobInfo> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Fetch the execution logs of a finished job
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    /// * `log_type` - Which log stream to fetch
    ///
    /// # Returns
    /// The raw log text.
    pub async fn job_logs(&self, job_id: &str, log_type: LogType) -> Result<String> {
        let url = format!(
            "{}/jobs/{}/logs?type={}",
            self.base_url,
            job_id,
            log_type.as_str()
        );
        let response = self.client.get(&url).send().await?;

        self.handle_text_response(response).await
    }

    /// Fetch the report URL for a finished job
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    ///
    /// # Returns
    /// The report URL as a raw string.
    pub async fn report_url(&self, job_id: &str) -> Result<String> {
        let url = format!("{}/jobs/{}/report", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        let report = self.handle_text_response(response).await?;
        Ok(report.trim().to_string())
    }
}
