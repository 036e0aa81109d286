//! Job domain types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Job status snapshot returned by `GET /jobs/{id}`
///
/// Overwritten on every poll tick; the step never keeps history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub id: String,
    pub status: JobStatus,
}

/// Job execution status as reported by the executor service
///
/// `Completed` and `Failed` are terminal. Any status tag the executor adds in
/// the future deserializes to `Unknown` and is treated as non-terminal, so a
/// newer server cannot wedge the step into an early stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether polling should stop at this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Which executor log stream to fetch after the job finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Out,
    Error,
    All,
}

impl LogType {
    /// Map the raw `LOG_TYPE` input to a selector
    ///
    /// `"output"` selects stdout, `"error"` selects stderr, and anything else
    /// (including an absent input) selects both streams.
    pub fn from_input(input: Option<&str>) -> Self {
        match input {
            Some("output") => LogType::Out,
            Some("error") => LogType::Error,
            _ => LogType::All,
        }
    }

    /// Query-string value for `GET /jobs/{id}/logs?type=..`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Out => "out",
            LogType::Error => "error",
            LogType::All => "all",
        }
    }
}
