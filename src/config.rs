use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SEARCH_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_VISION_MODEL: &str = "gemini-3-pro-preview";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 90;
const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 30;

/// Environment variables consulted, in order, when no API key is configured.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// The one blob the app persists: where to poll for questions and when that
/// last worked. Keys are camelCase so blobs written by the web build load too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub last_successful_sync: Option<String>,
    #[serde(default = "default_auto_sync")]
    pub is_auto_sync: bool,
}

fn default_auto_sync() -> bool {
    true
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            last_successful_sync: None,
            is_auto_sync: true,
        }
    }
}

impl WorkflowConfig {
    pub fn has_webhook(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    pub fn should_auto_sync(&self) -> bool {
        self.is_auto_sync && self.has_webhook()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub search_model: Option<String>,
    pub vision_model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl GeminiConfig {
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_GEMINI_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn search_model(&self) -> String {
        non_empty_or(self.search_model.as_deref(), DEFAULT_SEARCH_MODEL)
    }

    pub fn vision_model(&self) -> String {
        non_empty_or(self.vision_model.as_deref(), DEFAULT_VISION_MODEL)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS)
    }

    /// Configured key first, then the process environment. Read per call so a
    /// key exported after launch is still picked up.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
        API_KEY_ENV_VARS.iter().find_map(|name| {
            std::env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Launch-time settings. Everything here comes from CLI flags or the
/// environment; only [`WorkflowConfig`] is ever written back to disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub config_path: String,
    pub gemini: GeminiConfig,
    pub sync_timeout_secs: Option<u64>,
    pub seed_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn convention_defaults(config_path: &str) -> Self {
        Self {
            config_path: config_path.to_string(),
            gemini: GeminiConfig {
                api_key: None,
                base_url: Some(DEFAULT_GEMINI_BASE_URL.to_string()),
                search_model: Some(DEFAULT_SEARCH_MODEL.to_string()),
                vision_model: Some(DEFAULT_VISION_MODEL.to_string()),
                timeout_secs: Some(DEFAULT_PROVIDER_TIMEOUT_SECS),
            },
            sync_timeout_secs: Some(DEFAULT_SYNC_TIMEOUT_SECS),
            seed_webhook_url: None,
        }
    }

    pub fn sync_timeout_secs(&self) -> u64 {
        self.sync_timeout_secs.unwrap_or(DEFAULT_SYNC_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_defaults_match_first_launch() {
        let config = WorkflowConfig::default();
        assert_eq!(config.webhook_url, "");
        assert_eq!(config.last_successful_sync, None);
        assert!(config.is_auto_sync);
        assert!(!config.should_auto_sync());
    }

    #[test]
    fn workflow_uses_camel_case_keys() {
        let config = WorkflowConfig {
            webhook_url: "https://n8n.example/webhook/mcq".to_string(),
            last_successful_sync: Some("2026-01-02 09:15:00".to_string()),
            is_auto_sync: false,
        };
        let value = serde_json::to_value(&config).expect("serialize");
        assert_eq!(value["webhookUrl"], "https://n8n.example/webhook/mcq");
        assert_eq!(value["lastSuccessfulSync"], "2026-01-02 09:15:00");
        assert_eq!(value["isAutoSync"], false);

        let missing_flag: WorkflowConfig =
            serde_json::from_str(r#"{"webhookUrl":"x","lastSuccessfulSync":null}"#)
                .expect("partial blob");
        assert!(missing_flag.is_auto_sync);
    }

    #[test]
    fn gemini_defaults_fill_blank_values() {
        let gemini = GeminiConfig {
            api_key: Some("  key  ".to_string()),
            base_url: Some("http://localhost:9000/v1beta/".to_string()),
            search_model: Some("  ".to_string()),
            vision_model: None,
            timeout_secs: None,
        };
        assert_eq!(gemini.base_url(), "http://localhost:9000/v1beta");
        assert_eq!(gemini.search_model(), DEFAULT_SEARCH_MODEL);
        assert_eq!(gemini.vision_model(), DEFAULT_VISION_MODEL);
        assert_eq!(gemini.timeout_secs(), 90);
        assert_eq!(gemini.resolve_api_key().as_deref(), Some("key"));
    }

    #[test]
    fn convention_defaults_point_at_gemini() {
        let config = AppConfig::convention_defaults("/tmp/workflow.json");
        assert_eq!(config.gemini.base_url(), DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.sync_timeout_secs(), 30);
        assert_eq!(config.seed_webhook_url, None);
    }
}
