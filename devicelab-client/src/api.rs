//! The `ExecutorApi` trait
//!
//! Seam between the step's orchestration logic and HTTP transport. The
//! orchestrator is written against this trait so its state machine can be
//! exercised with a scripted fake; `ExecutorClient` is the production
//! implementation.

use std::path::Path;

use async_trait::async_trait;
use devicelab_core::domain::job::{JobInfo, LogType};
use devicelab_core::domain::scriptless::ScriptlessStatus;
use devicelab_core::dto::submit::SubmitRequest;

use crate::ExecutorClient;
use crate::error::Result;

/// Everything the step needs from the executor service
#[async_trait]
pub trait ExecutorApi: Send + Sync {
    /// Submit a job; returns the opaque job identifier
    async fn submit(&self, req: &SubmitRequest) -> Result<String>;

    /// Fetch the current job status snapshot
    async fn job_status(&self, job_id: &str) -> Result<JobInfo>;

    /// Fetch the execution logs of a finished job
    async fn job_logs(&self, job_id: &str, log_type: LogType) -> Result<String>;

    /// Fetch the report URL of a finished job
    async fn report_url(&self, job_id: &str) -> Result<String>;

    /// Fetch the current scriptless status snapshot
    async fn scriptless_status(&self, job_id: &str) -> Result<ScriptlessStatus>;

    /// Download the scriptless HTML report to `dest`
    async fn download_scriptless_report(&self, job_id: &str, dest: &Path) -> Result<()>;
}

#[async_trait]
impl ExecutorApi for ExecutorClient {
    async fn submit(&self, req: &SubmitRequest) -> Result<String> {
        ExecutorClient::submit(self, req).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobInfo> {
        ExecutorClient::job_status(self, job_id).await
    }

    async fn job_logs(&self, job_id: &str, log_type: LogType) -> Result<String> {
        ExecutorClient::job_logs(self, job_id, log_type).await
    }

    async fn report_url(&self, job_id: &str) -> Result<String> {
        ExecutorClient::report_url(self, job_id).await
    }

    async fn scriptless_status(&self, job_id: &str) -> Result<ScriptlessStatus> {
        ExecutorClient::scriptless_status(self, job_id).await
    }

    async fn download_scriptless_report(&self, job_id: &str, dest: &Path) -> Result<()> {
        ExecutorClient::download_scriptless_report(self, job_id, dest).await
    }
}
