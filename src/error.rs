use thiserror::Error;

/// Every failure the study app can surface. Payloads are plain strings so the
/// error can travel inside UI messages, which must be `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("Please set your n8n Webhook URL in settings.")]
    NotConfigured,
    #[error("n8n Webhook returned an error (HTTP {0}).")]
    WebhookStatus(u16),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("malformed webhook payload: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub use crate::Result;
