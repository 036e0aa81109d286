//! Step output publishing
//!
//! Downstream pipeline steps pick results up as named environment variables.
//! Publishing goes through the CI environment-export helper (`envman add`)
//! when it is on the PATH; outside a CI run the values are just logged.

use std::process::Command;

use devicelab_core::domain::run::RunReport;
use tracing::{debug, info, warn};

pub const OUTPUT_JOB_ID: &str = "JOB_ID";
pub const OUTPUT_REPORT_URL: &str = "REPORT_URL";
pub const OUTPUT_SCRIPTLESS_PASSED: &str = "SCRIPTLESS_PASSED";

/// Publish the run report as named step outputs
///
/// `JOB_ID` and `REPORT_URL` are always published, even when empty;
/// `SCRIPTLESS_PASSED` only when scriptless automation actually ran.
pub fn publish(report: &RunReport) {
    for (key, value) in collect(report) {
        expose(key, &value);
    }
}

/// The key/value pairs a report publishes, in order
fn collect(report: &RunReport) -> Vec<(&'static str, String)> {
    let mut outputs = vec![
        (OUTPUT_JOB_ID, report.job_id.clone()),
        (OUTPUT_REPORT_URL, report.report_url.clone()),
    ];

    if let Some(scriptless) = &report.scriptless {
        outputs.push((OUTPUT_SCRIPTLESS_PASSED, scriptless.passed.to_string()));
    }

    outputs
}

/// Export one key/value pair for downstream steps
fn expose(key: &str, value: &str) {
    match Command::new("envman")
        .args(["add", "--key", key, "--value", value])
        .status()
    {
        Ok(status) if status.success() => debug!("exported {}", key),
        Ok(status) => warn!("envman add {} exited with {}", key, status),
        // envman missing is the normal case outside CI.
        Err(_) => info!("output {}={}", key, value),
    }
}
