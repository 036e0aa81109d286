//! Step configuration
//!
//! All inputs arrive as environment variables set by the CI orchestrator.
//! Only the executor URL is required; malformed boolean or integer values
//! are silently coerced to false/zero so a half-filled pipeline config
//! degrades instead of failing the step before it starts.

use std::path::PathBuf;
use std::time::Duration;

use devicelab_client::Credentials;
use devicelab_core::domain::job::LogType;

/// Step configuration
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// Executor base URL (e.g., "http://localhost:4545")
    pub executor_url: String,
    pub executor_username: String,
    pub executor_password: String,

    /// Upstream device-cloud account, forwarded as an extra credential
    /// header when both halves are present
    pub device_cloud_username: String,
    pub device_cloud_api_key: String,

    /// Source repository the executor checks out
    pub git_repo_url: String,
    pub git_repo_branch: String,
    pub git_ssh_key: String,
    pub root_directory: String,

    /// Newline-delimited commands to run inside the checkout
    pub commands: String,

    /// CI release identifier carried in the submission payload
    pub release_id: String,

    /// When false, submit the job and exit without polling (fire-and-forget)
    pub wait_for_execution: bool,
    pub log_type: LogType,

    /// Device selection; the desiredCaps payload section is only sent when
    /// `use_custom_device` is set
    pub use_custom_device: bool,
    pub device_name: String,
    pub device_platform: String,
    pub device_platform_version: String,
    pub app_id: String,

    /// Scriptless automation request and its own polling budget
    pub scriptless_automation: bool,
    pub scriptless_timeout: Duration,
    pub device_bundle: String,

    /// Where downloaded artifacts are published for later pipeline steps
    pub deploy_dir: PathBuf,
}

impl StepConfig {
    /// Creates configuration from environment variables
    ///
    /// `EXECUTOR_URL` is required; everything else falls back to an empty
    /// string, `false`, or zero.
    pub fn from_env() -> anyhow::Result<Self> {
        let executor_url = std::env::var("EXECUTOR_URL")
            .map_err(|_| anyhow::anyhow!("EXECUTOR_URL environment variable not set"))?;

        Ok(Self {
            executor_url,
            executor_username: env_string("EXECUTOR_USERNAME"),
            executor_password: env_string("EXECUTOR_PASSWORD"),
            device_cloud_username: env_string("DEVICE_CLOUD_USERNAME"),
            device_cloud_api_key: env_string("DEVICE_CLOUD_API_KEY"),
            git_repo_url: env_string("GIT_REPO_URL"),
            git_repo_branch: env_string("GIT_REPO_BRANCH"),
            git_ssh_key: env_string("GIT_SSH_KEY"),
            root_directory: env_string("ROOT_DIRECTORY"),
            commands: env_string("COMMANDS"),
            release_id: env_string("RELEASE_ID"),
            wait_for_execution: parse_bool(&env_string("WAIT_FOR_EXECUTION")),
            log_type: LogType::from_input(std::env::var("LOG_TYPE").ok().as_deref()),
            use_custom_device: parse_bool(&env_string("USE_CUSTOM_DEVICE")),
            device_name: env_string("DEVICE_NAME"),
            device_platform: env_string("DEVICE_PLATFORM"),
            device_platform_version: env_string("DEVICE_PLATFORM_VERSION"),
            app_id: env_string("APP_ID"),
            scriptless_automation: parse_bool(&env_string("SCRIPTLESS_AUTOMATION")),
            scriptless_timeout: Duration::from_secs(parse_u64(&env_string("SCRIPTLESS_TIMEOUT"))),
            device_bundle: env_string("DEVICE_BUNDLE"),
            deploy_dir: PathBuf::from(env_string("DEPLOY_DIR")),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.executor_url.is_empty() {
            anyhow::bail!("executor_url cannot be empty");
        }

        if !self.executor_url.starts_with("http://") && !self.executor_url.starts_with("https://") {
            anyhow::bail!("executor_url must start with http:// or https://");
        }

        Ok(())
    }

    /// Executor service credentials
    pub fn executor_credentials(&self) -> Credentials {
        Credentials::new(&self.executor_username, &self.executor_password)
    }

    /// Device-cloud credentials, if the pipeline configured that account
    pub fn device_cloud_credentials(&self) -> Option<Credentials> {
        if self.device_cloud_username.is_empty() || self.device_cloud_api_key.is_empty() {
            return None;
        }
        Some(Credentials::new(
            &self.device_cloud_username,
            &self.device_cloud_api_key,
        ))
    }
}

#[cfg(test)]
impl StepConfig {
    /// An empty baseline config pointing at a local executor, for tests that
    /// only care about a handful of fields
    pub(crate) fn for_tests() -> Self {
        StepConfig {
            executor_url: "http://localhost:4545".to_string(),
            executor_username: String::new(),
            executor_password: String::new(),
            device_cloud_username: String::new(),
            device_cloud_api_key: String::new(),
            git_repo_url: String::new(),
            git_repo_branch: String::new(),
            git_ssh_key: String::new(),
            root_directory: String::new(),
            commands: String::new(),
            release_id: String::new(),
            wait_for_execution: false,
            log_type: LogType::All,
            use_custom_device: false,
            device_name: String::new(),
            device_platform: String::new(),
            device_platform_version: String::new(),
            app_id: String::new(),
            scriptless_automation: false,
            scriptless_timeout: Duration::from_secs(0),
            device_bundle: String::new(),
            deploy_dir: PathBuf::new(),
        }
    }
}

fn env_string(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

/// Coerce a boolean input; anything other than a well-formed "true" is false
fn parse_bool(value: &str) -> bool {
    value.trim().parse::<bool>().unwrap_or(false)
}

/// Coerce an integer input; malformed values become zero
fn parse_u64(value: &str) -> u64 {
    value.trim().parse::<u64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_coercion() {
        assert!(parse_bool("true"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool("TRUE "));
        assert!(parse_bool(" true "));
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(parse_u64("300"), 300);
        assert_eq!(parse_u64(""), 0);
        assert_eq!(parse_u64("5m"), 0);
        assert_eq!(parse_u64("-1"), 0);
    }

    #[test]
    fn test_device_cloud_credentials_require_both_halves() {
        let mut config = StepConfig::for_tests();
        config.device_cloud_username = "cloud-user".to_string();

        assert!(config.device_cloud_credentials().is_none());

        config.device_cloud_api_key = "api-key".to_string();
        assert!(config.device_cloud_credentials().is_some());
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = StepConfig::for_tests();
        assert!(config.validate().is_ok());

        config.executor_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }
}
