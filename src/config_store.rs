use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::WorkflowConfig;
use crate::error::{AppError, Result};

/// Fixed key the workflow blob lives under (file stem for the on-disk store).
pub const WORKFLOW_STORE_KEY: &str = "educateurself_workflow";

/// Persistence port for the workflow blob. `load` never fails: a missing or
/// corrupt blob yields the defaults.
pub trait ConfigStore: Send {
    fn load(&self) -> WorkflowConfig;
    fn save(&mut self, config: &WorkflowConfig) -> Result<()>;
}

fn parse_blob(raw: &str, origin: &str) -> WorkflowConfig {
    match serde_json::from_str::<WorkflowConfig>(raw) {
        Ok(config) => config,
        Err(err) => {
            warn!(origin, error = %err, "stored workflow config is unreadable; using defaults");
            WorkflowConfig::default()
        }
    }
}

fn encode_blob(config: &WorkflowConfig) -> Result<String> {
    serde_json::to_string_pretty(config).map_err(|e| AppError::Serialization(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> WorkflowConfig {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_blob(&raw, &self.path.to_string_lossy()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no workflow config yet");
                WorkflowConfig::default()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read workflow config");
                WorkflowConfig::default()
            }
        }
    }

    fn save(&mut self, config: &WorkflowConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("create {}: {e}", parent.display()))
            })?;
        }
        let json = encode_blob(config)?;
        fs::write(&self.path, json)
            .map_err(|e| AppError::Storage(format!("write {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "workflow config saved");
        Ok(())
    }
}

/// Keeps the blob as serialized text, exactly like the on-disk store, so
/// round-trips exercise the same encoding.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    blob: Option<String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(raw: impl Into<String>) -> Self {
        Self {
            blob: Some(raw.into()),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> WorkflowConfig {
        self.blob
            .as_deref()
            .map(|raw| parse_blob(raw, "memory"))
            .unwrap_or_default()
    }

    fn save(&mut self, config: &WorkflowConfig) -> Result<()> {
        self.blob = Some(encode_blob(config)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_configs() -> Vec<WorkflowConfig> {
        vec![
            WorkflowConfig::default(),
            WorkflowConfig {
                webhook_url: "https://n8n.example/webhook/approved".to_string(),
                last_successful_sync: Some("2026-03-04 18:22:10".to_string()),
                is_auto_sync: false,
            },
            WorkflowConfig {
                webhook_url: "  spaced  ".to_string(),
                last_successful_sync: None,
                is_auto_sync: true,
            },
        ]
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryConfigStore::new();
        for config in sample_configs() {
            store.save(&config).unwrap();
            assert_eq!(store.load(), config);
        }
    }

    #[test]
    fn saved_blob_uses_web_build_keys() {
        let mut store = MemoryConfigStore::new();
        assert_eq!(store.blob(), None);
        store.save(&sample_configs()[1]).unwrap();

        let raw: serde_json::Value = serde_json::from_str(store.blob().unwrap()).unwrap();
        assert_eq!(raw["webhookUrl"], "https://n8n.example/webhook/approved");
        assert_eq!(raw["lastSuccessfulSync"], "2026-03-04 18:22:10");
        assert_eq!(raw["isAutoSync"], false);
    }

    #[test]
    fn memory_store_defaults_when_absent_or_corrupt() {
        assert_eq!(MemoryConfigStore::new().load(), WorkflowConfig::default());
        assert_eq!(
            MemoryConfigStore::with_blob("{not json").load(),
            WorkflowConfig::default()
        );
        assert_eq!(
            MemoryConfigStore::with_blob("[1,2,3]").load(),
            WorkflowConfig::default()
        );
    }

    #[test]
    fn file_store_round_trips_and_creates_parent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("workflow.json");
        let mut store = FileConfigStore::new(&path);
        assert_eq!(store.load(), WorkflowConfig::default());

        for config in sample_configs() {
            store.save(&config).unwrap();
            assert_eq!(FileConfigStore::new(&path).load(), config);
        }
    }

    #[test]
    fn file_store_reads_web_build_blob() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("workflow.json");
        fs::write(
            &path,
            r#"{"webhookUrl":"https://hooks.example/q","lastSuccessfulSync":"1/2/2026, 10:00:00 AM","isAutoSync":true}"#,
        )
        .unwrap();
        let config = FileConfigStore::new(&path).load();
        assert_eq!(config.webhook_url, "https://hooks.example/q");
        assert_eq!(
            config.last_successful_sync.as_deref(),
            Some("1/2/2026, 10:00:00 AM")
        );
    }

    #[test]
    fn file_store_defaults_on_garbage() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("workflow.json");
        fs::write(&path, "garbage").unwrap();
        assert_eq!(FileConfigStore::new(&path).load(), WorkflowConfig::default());
    }
}
