//! Step orchestration
//!
//! Drives the end-to-end sequence for one job: submit, optionally wait for
//! the job to finish, fetch logs and the report URL, optionally wait for the
//! scriptless subsystem, and finally download the scriptless report.
//!
//! The two waits share the generic polling engine and run strictly one after
//! the other. Transport failures abort the run; timeouts and scriptless
//! failures degrade to flags on the returned [`RunReport`].

use std::time::Duration;

use devicelab_client::error::Result;
use devicelab_client::{ExecutorApi, SCRIPTLESS_REPORT_FILENAME};
use devicelab_core::domain::run::{RunReport, ScriptlessOutcome};
use devicelab_core::domain::scriptless::ScriptlessStatus;
use tracing::{debug, info, warn};

use crate::config::StepConfig;
use crate::poller::{POLL_TICK, poll_until};
use crate::request;

/// How long the job-status wait may last before the step gives up
const JOB_WAIT_BUDGET: Duration = Duration::from_secs(3600);

/// Orchestrates a single job run against the executor
pub struct StepRunner<A> {
    config: StepConfig,
    api: A,
}

impl<A: ExecutorApi> StepRunner<A> {
    /// Creates a new runner
    pub fn new(config: StepConfig, api: A) -> Self {
        Self { config, api }
    }

    /// Run the step to completion and return the report to publish
    ///
    /// Returns an error only for transport failures during submission or
    /// result fetching; every other failure mode is recorded on the report.
    pub async fn run(&self) -> Result<RunReport> {
        let payload = request::build(&self.config);

        let job_id = self.api.submit(&payload).await?;
        info!("submitted job {}", job_id);

        let mut report = RunReport::for_job(&job_id);

        if !self.config.wait_for_execution {
            debug!("wait_for_execution disabled, leaving job to run");
            return Ok(report);
        }

        if !self.wait_for_job(&mut report).await? {
            return Ok(report);
        }

        self.fetch_results(&mut report).await?;

        if self.config.scriptless_automation {
            self.wait_for_scriptless(&mut report).await?;
        }

        Ok(report)
    }

    /// Poll the job status until terminal; returns false on timeout
    async fn wait_for_job(&self, report: &mut RunReport) -> Result<bool> {
        let job_id = report.job_id.as_str();
        info!("waiting for job {} to finish", job_id);

        let api = &self.api;
        let outcome = poll_until(
            POLL_TICK,
            JOB_WAIT_BUDGET,
            || async move {
                let info = api.job_status(job_id).await?;
                info!("job status: {}", info.status);
                Ok(info)
            },
            |info| info.status.is_terminal(),
        )
        .await?;

        if outcome.timed_out {
            report.job_timed_out = true;
            warn!("execution has reached the maximum waiting time");
            return Ok(false);
        }

        // COMPLETED and FAILED both land here; logs and report are worth
        // fetching either way.
        info!(
            "job {} finished with status {}",
            job_id, outcome.state.status
        );
        Ok(true)
    }

    /// Fetch execution logs and the report URL, once each, in that order
    async fn fetch_results(&self, report: &mut RunReport) -> Result<()> {
        let job_id = report.job_id.as_str();

        let logs = self.api.job_logs(job_id, self.config.log_type).await?;
        println!("{}", logs);

        report.report_url = self.api.report_url(job_id).await?;
        Ok(())
    }

    /// Poll the scriptless subsystem and download its report on success
    async fn wait_for_scriptless(&self, report: &mut RunReport) -> Result<()> {
        let job_id = report.job_id.as_str();
        info!("checking scriptless status");

        let api = &self.api;
        let outcome = poll_until(
            POLL_TICK,
            self.config.scriptless_timeout,
            || async move {
                let status = api.scriptless_status(job_id).await?;
                // Surface progress messages as they arrive, before any
                // terminality decision.
                for message in &status.messages {
                    info!("{}", message);
                }
                debug!("scriptless status: {:?}", status.status);
                Ok(status)
            },
            ScriptlessStatus::is_terminal,
        )
        .await?;

        if outcome.timed_out {
            report.scriptless = Some(ScriptlessOutcome {
                passed: false,
                timed_out: true,
            });
            warn!("scriptless testing timed out");
            return Ok(());
        }

        let status = outcome.state;
        if !status.error.is_empty() {
            report.scriptless = Some(ScriptlessOutcome {
                passed: false,
                timed_out: false,
            });
            warn!("scriptless testing failed with error: {}", status.error);
            return Ok(());
        }

        let passed = status.passed();
        report.scriptless = Some(ScriptlessOutcome {
            passed,
            timed_out: false,
        });
        if passed {
            info!("scriptless testing passed");
        } else {
            warn!("scriptless testing completed with failed executions");
        }

        // Best effort: a failed download must not change the run result.
        let dest = self.config.deploy_dir.join(SCRIPTLESS_REPORT_FILENAME);
        match self.api.download_scriptless_report(job_id, &dest).await {
            Ok(()) => info!("scriptless report is available at {}", dest.display()),
            Err(e) => warn!("scriptless report download failed: {}", e),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devicelab_client::ClientError;
    use devicelab_core::domain::job::{JobInfo, JobStatus, LogType};
    use devicelab_core::domain::scriptless::ScriptlessPhase;
    use devicelab_core::dto::submit::SubmitRequest;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    const JOB_ID: &str = "job-77";

    /// Call counters for asserting which endpoints a run touched
    #[derive(Debug, Default)]
    struct Calls {
        submit: usize,
        status: usize,
        logs: usize,
        report: usize,
        scriptless: usize,
        download: usize,
    }

    /// Scripted executor: plays back queued snapshots, repeating the last
    /// behavior (non-terminal) once a queue is exhausted
    ///
    /// `events` records the result-phase endpoints in call order.
    #[derive(Default)]
    struct ScriptedExecutor {
        statuses: Mutex<VecDeque<JobStatus>>,
        scriptless: Mutex<VecDeque<ScriptlessStatus>>,
        calls: Mutex<Calls>,
        events: Mutex<Vec<&'static str>>,
        fail_download: bool,
    }

    impl ScriptedExecutor {
        fn with_statuses(statuses: &[JobStatus]) -> Self {
            ScriptedExecutor {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                ..Default::default()
            }
        }

        fn with_scriptless(statuses: &[JobStatus], scriptless: Vec<ScriptlessStatus>) -> Self {
            ScriptedExecutor {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                scriptless: Mutex::new(scriptless.into_iter().collect()),
                ..Default::default()
            }
        }

        fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
            self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ExecutorApi for ScriptedExecutor {
        async fn submit(&self, _req: &SubmitRequest) -> devicelab_client::Result<String> {
            self.calls().submit += 1;
            Ok(JOB_ID.to_string())
        }

        async fn job_status(&self, job_id: &str) -> devicelab_client::Result<JobInfo> {
            self.calls().status += 1;
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(JobStatus::Running);
            Ok(JobInfo {
                id: job_id.to_string(),
                status,
            })
        }

        async fn job_logs(
            &self,
            _job_id: &str,
            _log_type: LogType,
        ) -> devicelab_client::Result<String> {
            self.calls().logs += 1;
            self.events.lock().unwrap().push("logs");
            Ok("test output".to_string())
        }

        async fn report_url(&self, _job_id: &str) -> devicelab_client::Result<String> {
            self.calls().report += 1;
            self.events.lock().unwrap().push("report");
            Ok("https://reports.example.com/job-77".to_string())
        }

        async fn scriptless_status(
            &self,
            _job_id: &str,
        ) -> devicelab_client::Result<ScriptlessStatus> {
            self.calls().scriptless += 1;
            Ok(self
                .scriptless
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(in_progress))
        }

        async fn download_scriptless_report(
            &self,
            _job_id: &str,
            _dest: &Path,
        ) -> devicelab_client::Result<()> {
            self.calls().download += 1;
            self.events.lock().unwrap().push("download");
            if self.fail_download {
                return Err(ClientError::api_error(404, "no report"));
            }
            Ok(())
        }
    }

    fn in_progress() -> ScriptlessStatus {
        ScriptlessStatus {
            status: ScriptlessPhase::InProgress,
            error: String::new(),
            messages: Vec::new(),
            executions_passed: None,
        }
    }

    fn completed(error: &str, executions_passed: Option<bool>) -> ScriptlessStatus {
        ScriptlessStatus {
            status: ScriptlessPhase::Completed,
            error: error.to_string(),
            messages: Vec::new(),
            executions_passed,
        }
    }

    /// In-memory log sink for asserting on emitted progress lines
    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn waiting_config() -> StepConfig {
        let mut config = StepConfig::for_tests();
        config.wait_for_execution = true;
        config
    }

    fn scriptless_config(timeout: Duration) -> StepConfig {
        let mut config = waiting_config();
        config.scriptless_automation = true;
        config.scriptless_timeout = timeout;
        config.deploy_dir = std::env::temp_dir();
        config
    }

    #[tokio::test]
    async fn test_fire_and_forget_only_submits() {
        let mut config = StepConfig::for_tests();
        config.wait_for_execution = false;

        let runner = StepRunner::new(config, ScriptedExecutor::default());
        let report = runner.run().await.unwrap();

        assert_eq!(report.job_id, JOB_ID);
        assert_eq!(report.report_url, "");
        assert!(!report.job_timed_out);
        assert!(report.scriptless.is_none());

        let calls = runner.api.calls();
        assert_eq!(calls.submit, 1);
        assert_eq!(calls.status, 0);
        assert_eq!(calls.logs, 0);
        assert_eq!(calls.report, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_fetches_logs_and_report_once() {
        let api = ScriptedExecutor::with_statuses(&[
            JobStatus::Running,
            JobStatus::Running,
            JobStatus::Completed,
        ]);
        let runner = StepRunner::new(waiting_config(), api);
        let report = runner.run().await.unwrap();

        assert_eq!(report.report_url, "https://reports.example.com/job-77");
        assert!(!report.job_timed_out);

        let calls = runner.api.calls();
        assert_eq!(calls.status, 3);
        assert_eq!(calls.logs, 1);
        assert_eq!(calls.report, 1);
        assert_eq!(calls.scriptless, 0);
        // Logs come first so the report URL caps the step's output.
        assert_eq!(*runner.api.events.lock().unwrap(), vec!["logs", "report"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_still_fetches_results() {
        let api = ScriptedExecutor::with_statuses(&[JobStatus::Failed]);
        let runner = StepRunner::new(waiting_config(), api);
        let report = runner.run().await.unwrap();

        assert_eq!(report.report_url, "https://reports.example.com/job-77");

        let calls = runner.api.calls();
        assert_eq!(calls.logs, 1);
        assert_eq!(calls.report, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_timeout_skips_everything_downstream() {
        // Scriptless is configured, but a primary-job timeout short-circuits
        // the rest of the pipeline.
        let mut config = scriptless_config(Duration::from_secs(300));
        config.wait_for_execution = true;

        let runner = StepRunner::new(config, ScriptedExecutor::default());
        let report = runner.run().await.unwrap();

        assert!(report.job_timed_out);
        assert_eq!(report.report_url, "");
        assert!(report.scriptless.is_none());

        let calls = runner.api.calls();
        // One hour at 30s ticks.
        assert_eq!(calls.status, 120);
        assert_eq!(calls.logs, 0);
        assert_eq!(calls.report, 0);
        assert_eq!(calls.scriptless, 0);
        assert_eq!(calls.download, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scriptless_pass_downloads_report() {
        let api = ScriptedExecutor::with_scriptless(
            &[JobStatus::Completed],
            vec![in_progress(), completed("", Some(true))],
        );
        let runner = StepRunner::new(scriptless_config(Duration::from_secs(300)), api);
        let report = runner.run().await.unwrap();

        let outcome = report.scriptless.unwrap();
        assert!(outcome.passed);
        assert!(!outcome.timed_out);

        let calls = runner.api.calls();
        assert_eq!(calls.scriptless, 2);
        assert_eq!(calls.download, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scriptless_messages_surface_in_order() {
        use tracing::instrument::WithSubscriber;

        let mut first = in_progress();
        first.messages = vec!["booting device".to_string(), "installing app".to_string()];
        let mut last = completed("", Some(true));
        last.messages = vec!["all executions finished".to_string()];

        let api = ScriptedExecutor::with_scriptless(&[JobStatus::Completed], vec![first, last]);
        let runner = StepRunner::new(scriptless_config(Duration::from_secs(300)), api);

        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish();

        let report = runner.run().with_subscriber(subscriber).await.unwrap();
        assert!(report.scriptless.unwrap().passed);

        let log = writer.contents();
        let boot = log.find("booting device").unwrap();
        let install = log.find("installing app").unwrap();
        let finished = log.find("all executions finished").unwrap();
        assert!(boot < install);
        // The terminal snapshot's messages are surfaced too, before the
        // pass/fail verdict lands in the log.
        assert!(install < finished);
        assert!(finished < log.find("scriptless testing passed").unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scriptless_failed_executions_still_download() {
        let api = ScriptedExecutor::with_scriptless(
            &[JobStatus::Completed],
            vec![completed("", Some(false))],
        );
        let runner = StepRunner::new(scriptless_config(Duration::from_secs(300)), api);
        let report = runner.run().await.unwrap();

        let outcome = report.scriptless.unwrap();
        assert!(!outcome.passed);
        assert!(!outcome.timed_out);
        assert_eq!(runner.api.calls().download, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scriptless_error_skips_download() {
        let api = ScriptedExecutor::with_scriptless(
            &[JobStatus::Completed],
            vec![completed("device lost", None)],
        );
        let runner = StepRunner::new(scriptless_config(Duration::from_secs(300)), api);
        let report = runner.run().await.unwrap();

        let outcome = report.scriptless.unwrap();
        assert!(!outcome.passed);
        assert_eq!(runner.api.calls().download, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scriptless_timeout_skips_download() {
        let api = ScriptedExecutor::with_scriptless(&[JobStatus::Completed], vec![]);
        let runner = StepRunner::new(scriptless_config(Duration::from_secs(60)), api);
        let report = runner.run().await.unwrap();

        let outcome = report.scriptless.unwrap();
        assert!(!outcome.passed);
        assert!(outcome.timed_out);

        let calls = runner.api.calls();
        // Checks at t=30 and t=60; the second exhausts the budget.
        assert_eq!(calls.scriptless, 2);
        assert_eq!(calls.download, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_failure_keeps_run_result() {
        let api = ScriptedExecutor {
            statuses: Mutex::new([JobStatus::Completed].into_iter().collect()),
            scriptless: Mutex::new([completed("", Some(true))].into_iter().collect()),
            fail_download: true,
            ..Default::default()
        };
        let runner = StepRunner::new(scriptless_config(Duration::from_secs(300)), api);
        let report = runner.run().await.unwrap();

        let outcome = report.scriptless.unwrap();
        assert!(outcome.passed);
        assert_eq!(runner.api.calls().download, 1);
    }

    #[tokio::test]
    async fn test_submit_failure_is_fatal() {
        struct FailingSubmit;

        #[async_trait]
        impl ExecutorApi for FailingSubmit {
            async fn submit(&self, _req: &SubmitRequest) -> devicelab_client::Result<String> {
                Err(ClientError::api_error(500, "boom"))
            }
            async fn job_status(&self, _job_id: &str) -> devicelab_client::Result<JobInfo> {
                unreachable!()
            }
            async fn job_logs(
                &self,
                _job_id: &str,
                _log_type: LogType,
            ) -> devicelab_client::Result<String> {
                unreachable!()
            }
            async fn report_url(&self, _job_id: &str) -> devicelab_client::Result<String> {
                unreachable!()
            }
            async fn scriptless_status(
                &self,
                _job_id: &str,
            ) -> devicelab_client::Result<ScriptlessStatus> {
                unreachable!()
            }
            async fn download_scriptless_report(
                &self,
                _job_id: &str,
                _dest: &Path,
            ) -> devicelab_client::Result<()> {
                unreachable!()
            }
        }

        let runner = StepRunner::new(StepConfig::for_tests(), FailingSubmit);
        assert!(runner.run().await.is_err());
    }
}
