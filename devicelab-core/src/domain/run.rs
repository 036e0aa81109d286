//! Run report types
//!
//! The step threads a single `RunReport` through the whole orchestration and
//! reads it once at the end to publish outputs. There is no ambient state.

/// Final outcome of one step invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Opaque job identifier returned by the submit call
    pub job_id: String,
    /// Report URL, or empty if the run never got that far
    pub report_url: String,
    /// The job-status poll exhausted its budget without a terminal status
    pub job_timed_out: bool,
    /// Present only when scriptless automation was requested and ran
    pub scriptless: Option<ScriptlessOutcome>,
}

impl RunReport {
    /// Start a report for a freshly submitted job
    pub fn for_job(job_id: impl Into<String>) -> Self {
        RunReport {
            job_id: job_id.into(),
            ..Default::default()
        }
    }
}

/// Outcome of the scriptless polling phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptlessOutcome {
    pub passed: bool,
    pub timed_out: bool,
}
