//! Scriptless automation domain types

use serde::{Deserialize, Serialize};

/// Scriptless status snapshot returned by `GET /jobs/{id}/scriptless/status`
///
/// `messages` carries human-readable progress lines that the step surfaces as
/// they arrive; the server clears already-delivered messages, so each
/// snapshot only holds the new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptlessStatus {
    pub status: ScriptlessPhase,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub executions_passed: Option<bool>,
}

impl ScriptlessStatus {
    /// Whether polling should stop at this snapshot
    pub fn is_terminal(&self) -> bool {
        self.status == ScriptlessPhase::Completed
    }

    /// Pass/fail result of the scriptless run
    ///
    /// Only meaningful when the status is terminal and `error` is empty.
    /// Older executor builds omit `executionsPassed`, in which case a clean
    /// completion counts as passed.
    pub fn passed(&self) -> bool {
        self.is_terminal() && self.error.is_empty() && self.executions_passed.unwrap_or(true)
    }
}

/// Scriptless execution phase
///
/// The subsystem only has one terminal tag; everything else is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptlessPhase {
    Completed,
    #[serde(other)]
    InProgress,
}
