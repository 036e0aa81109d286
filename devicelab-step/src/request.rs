//! Submission request builder
//!
//! Pure translation from step configuration to the executor wire payload.
//! No validation happens here; the executor is the authority on what a
//! usable submission looks like.

use devicelab_core::dto::submit::{
    CiConfig, DesiredCaps, ScriptlessConfig, SubmitRequest, TestConfig,
};

use crate::config::StepConfig;

/// Build the `POST /submit` payload from the step configuration
pub fn build(config: &StepConfig) -> SubmitRequest {
    let desired_caps = config.use_custom_device.then(|| DesiredCaps {
        device_name: config.device_name.clone(),
        platform_version: config.device_platform_version.clone(),
        platform_name: config.device_platform.clone(),
        app: config.app_id.clone(),
    });

    let scriptless_config = config.scriptless_automation.then(|| ScriptlessConfig {
        scriptless_automation: true,
        scriptless_timeout: config.scriptless_timeout.as_secs(),
        device_bundle: config.device_bundle.clone(),
    });

    SubmitRequest {
        desired_caps,
        test_config: TestConfig {
            git: config.git_repo_url.clone(),
            ssh: config.git_ssh_key.clone(),
            branch: config.git_repo_branch.clone(),
            root_directory: config.root_directory.clone(),
            commands: split_commands(&config.commands),
        },
        ci_config: CiConfig {
            release_id: config.release_id.clone(),
        },
        scriptless_config,
    }
}

/// Split the newline-delimited command input into an ordered command list,
/// dropping empty lines (and tolerating CRLF input)
fn split_commands(commands: &str) -> Vec<String> {
    commands
        .split('\n')
        .map(|c| c.trim_end_matches('\r'))
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}
