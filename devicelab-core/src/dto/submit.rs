//! Job submission payload
//!
//! Built once per run and POSTed to `{executor}/submit`. The executor keys
//! off the *presence* of `desiredCaps` and `scriptlessConfig`, so both are
//! omitted from the JSON when the corresponding feature is not requested.

use serde::{Deserialize, Serialize};

/// Body of `POST /submit`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_caps: Option<DesiredCaps>,
    pub test_config: TestConfig,
    #[serde(rename = "azureConfig")]
    pub ci_config: CiConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scriptless_config: Option<ScriptlessConfig>,
}

/// Device selection, present only when the step pins a custom device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredCaps {
    pub device_name: String,
    pub platform_version: String,
    pub platform_name: String,
    pub app: String,
}

/// Source checkout and commands the executor runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub git: String,
    pub ssh: String,
    pub branch: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub root_directory: String,
    pub commands: Vec<String>,
}

/// CI release coordinates, carried on the wire as `azureConfig`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiConfig {
    pub release_id: String,
}

/// Scriptless automation request, present only when the feature is enabled
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptlessConfig {
    pub scriptless_automation: bool,
    pub scriptless_timeout: u64,
    pub device_bundle: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> SubmitRequest {
        SubmitRequest {
            desired_caps: None,
            test_config: TestConfig {
                git: "https://example.com/repo.git".to_string(),
                ssh: String::new(),
                branch: "main".to_string(),
                root_directory: String::new(),
                commands: vec!["mvn test".to_string()],
            },
            ci_config: CiConfig {
                release_id: "42".to_string(),
            },
            scriptless_config: None,
        }
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let json = serde_json::to_value(base_request()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("desiredCaps"));
        assert!(!obj.contains_key("scriptlessConfig"));
        assert!(obj.contains_key("testConfig"));
        assert!(obj.contains_key("azureConfig"));
    }

    #[test]
    fn test_empty_root_directory_is_omitted() {
        let json = serde_json::to_value(base_request()).unwrap();
        assert!(json["testConfig"].get("rootDirectory").is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let mut req = base_request();
        req.desired_caps = Some(DesiredCaps {
            device_name: "Pixel 7".to_string(),
            platform_version: "14".to_string(),
            platform_name: "Android".to_string(),
            app: "store:v9".to_string(),
        });
        req.scriptless_config = Some(ScriptlessConfig {
            scriptless_automation: true,
            scriptless_timeout: 300,
            device_bundle: "20".to_string(),
        });

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["desiredCaps"]["deviceName"], "Pixel 7");
        assert_eq!(json["desiredCaps"]["platformName"], "Android");
        assert_eq!(json["azureConfig"]["releaseId"], "42");
        assert_eq!(json["scriptlessConfig"]["scriptlessTimeout"], 300);
        assert_eq!(json["scriptlessConfig"]["deviceBundle"], "20");
    }
}
