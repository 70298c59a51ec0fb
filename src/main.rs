use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use educateurself::config::{AppConfig, GeminiConfig};
use educateurself::error::{AppError, Result};
use educateurself::iced_ui::{self, IcedUiLaunchConfig};
use educateurself::logging::init_tracing;
use educateurself::providers::gemini::GeminiProvider;
use educateurself::quiz::sync::WebhookSyncClient;

#[derive(Parser, Debug)]
#[command(name = "educateurself")]
#[command(about = "EducateUrSelf civil-services study desk")]
struct Cli {
    /// Where the workflow config (webhook URL, last sync, auto-sync) is kept.
    #[arg(long, env = "EDUCATEURSELF_CONFIG", default_value_t = educateurself::runtime_paths::default_config_path())]
    config: String,

    /// Overrides the stored n8n webhook URL.
    #[arg(long, env = "EDUCATEURSELF_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Gemini API key. When absent, `GEMINI_API_KEY` then `API_KEY` are read.
    #[arg(long, env = "EDUCATEURSELF_GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "EDUCATEURSELF_GEMINI_BASE_URL")]
    gemini_base_url: Option<String>,

    #[arg(long, env = "EDUCATEURSELF_SEARCH_MODEL")]
    search_model: Option<String>,

    #[arg(long, env = "EDUCATEURSELF_VISION_MODEL")]
    vision_model: Option<String>,

    #[arg(long, env = "EDUCATEURSELF_SYNC_TIMEOUT_SECS")]
    sync_timeout_secs: Option<u64>,
}

impl Cli {
    fn into_app_config(self) -> AppConfig {
        let mut config = AppConfig::convention_defaults(&self.config);
        let defaults = config.gemini.clone();
        config.gemini = GeminiConfig {
            api_key: self.gemini_api_key,
            base_url: self.gemini_base_url.or(defaults.base_url),
            search_model: self.search_model.or(defaults.search_model),
            vision_model: self.vision_model.or(defaults.vision_model),
            timeout_secs: defaults.timeout_secs,
        };
        if self.sync_timeout_secs.is_some() {
            config.sync_timeout_secs = self.sync_timeout_secs;
        }
        config.seed_webhook_url = self.webhook_url;
        config
    }
}

fn main() -> Result<()> {
    init_tracing("educateurself");

    let config = Cli::parse().into_app_config();
    tracing::info!(
        config = %config.config_path,
        search_model = %config.gemini.search_model(),
        vision_model = %config.gemini.vision_model(),
        version = env!("EDUCATEURSELF_GIT_SHA"),
        "starting EducateUrSelf"
    );
    if config.gemini.resolve_api_key().is_none() {
        tracing::warn!("no Gemini API key found; News AI and Scan Notes will report an error");
    }

    let sync_client = WebhookSyncClient::new(Duration::from_secs(config.sync_timeout_secs()))?;
    let assistant = GeminiProvider::new(config.gemini.clone())?;

    iced_ui::launch_ui(IcedUiLaunchConfig {
        config_path: PathBuf::from(&config.config_path),
        seed_webhook_url: config.seed_webhook_url.clone(),
        sync_client: Arc::new(sync_client),
        assistant: Arc::new(assistant),
    })
    .map_err(|e| AppError::Runtime(format!("failed to launch UI: {e}")))
}
