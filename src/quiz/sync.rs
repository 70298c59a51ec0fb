use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ::time::{OffsetDateTime, UtcOffset};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, Result};
use crate::quiz::decode::decode_questions;
use crate::quiz::{bootstrap_questions, QuizQuestion};

/// What a successful sync hands back to the app state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub questions: Vec<QuizQuestion>,
    /// Local wall-clock time of the sync, ready for display.
    pub synced_at: String,
    /// True when the webhook returned an empty array and the bootstrap set
    /// was used instead.
    pub used_fallback: bool,
}

pub struct WebhookSyncClient {
    client: Client,
    syncs: AtomicU64,
}

impl WebhookSyncClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("webhook client: {e}")))?;
        Ok(Self {
            client,
            syncs: AtomicU64::new(0),
        })
    }

    /// One GET against the webhook. Never retries; the caller keeps its
    /// current questions on any error.
    #[instrument(name = "webhook_sync", skip_all)]
    pub async fn sync(&self, webhook_url: &str) -> Result<SyncOutcome> {
        let url = webhook_url.trim();
        if url.is_empty() {
            return Err(AppError::NotConfigured);
        }

        let sync_no = self.syncs.fetch_add(1, Ordering::Relaxed) + 1;
        info!(sync_no, url, "syncing questions from webhook");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(sync_no, error = %e, "webhook request failed");
            AppError::Http(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(sync_no, status = status.as_u16(), "webhook returned non-success status");
            return Err(AppError::WebhookStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Http(format!("reading webhook body: {e}")))?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::Serialization(format!("webhook body is not JSON: {e}")))?;

        let stamp = unix_millis();
        let questions = decode_questions(&payload, |idx| format!("live-{sync_no}-{idx}-{stamp}"))?;

        let used_fallback = questions.is_empty();
        let questions = if used_fallback {
            debug!(sync_no, "webhook returned no questions; using bootstrap set");
            bootstrap_questions()
        } else {
            questions
        };

        info!(sync_no, count = questions.len(), "webhook sync complete");
        Ok(SyncOutcome {
            questions,
            synced_at: local_timestamp(),
            used_fallback,
        })
    }
}

fn unix_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

pub fn local_timestamp() -> String {
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let local_dt = OffsetDateTime::now_utc().to_offset(local_offset);

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        local_dt.year(),
        u8::from(local_dt.month()),
        local_dt.day(),
        local_dt.hour(),
        local_dt.minute(),
        local_dt.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_timestamp_is_human_readable() {
        let stamp = local_timestamp();
        assert_eq!(stamp.len(), 19, "{stamp}");
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }

    #[test]
    fn id_stamp_is_wall_clock_millis() {
        let before = OffsetDateTime::now_utc().unix_timestamp() as i128 * 1_000;
        let stamp = unix_millis();
        assert!(stamp >= before, "{stamp} < {before}");
        assert!(stamp < before + 60_000);
    }

    #[tokio::test]
    async fn blank_url_fails_without_network() {
        let client = WebhookSyncClient::new(Duration::from_secs(1)).unwrap();
        assert_eq!(client.sync("").await, Err(AppError::NotConfigured));
        assert_eq!(client.sync("   ").await, Err(AppError::NotConfigured));
    }
}
