use tracing::{info, warn};

use crate::app::audit::NoteAudit;
use crate::app::chat::SearchChat;
use crate::app::tabs::AppTab;
use crate::app::tasks::{OperationKind, TaskGuard, Ticket};
use crate::config::WorkflowConfig;
use crate::config_store::ConfigStore;
use crate::error::{AppError, Result};
use crate::interfaces::assistant::{GroundedAnswer, ImageInput};
use crate::quiz::session::{QuizSession, SelectOutcome};
use crate::quiz::sync::SyncOutcome;
use crate::syllabus::{SyllabusChecklist, SyllabusTrack};

/// Shown on the workflow panel when the webhook answered with an empty list.
pub const EMPTY_FEED_NOTICE: &str =
    "The webhook returned no approved questions; showing the built-in sample.";

/// Root application state. The view shell owns exactly one of these and
/// changes it only through the methods below.
pub struct StudyApp {
    store: Box<dyn ConfigStore>,
    workflow: WorkflowConfig,
    persist_error: Option<String>,
    session: QuizSession,
    active_tab: AppTab,
    sync_guard: TaskGuard,
    sync_error: Option<String>,
    sync_notice: Option<&'static str>,
    chat: SearchChat,
    audit: NoteAudit,
    syllabus: SyllabusChecklist,
}

impl StudyApp {
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        let workflow = store.load();
        Self {
            store,
            workflow,
            persist_error: None,
            session: QuizSession::default(),
            active_tab: AppTab::default(),
            sync_guard: TaskGuard::new(OperationKind::Sync),
            sync_error: None,
            sync_notice: None,
            chat: SearchChat::default(),
            audit: NoteAudit::default(),
            syllabus: SyllabusChecklist::default(),
        }
    }

    pub fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn active_tab(&self) -> AppTab {
        self.active_tab
    }

    pub fn chat(&self) -> &SearchChat {
        &self.chat
    }

    pub fn audit(&self) -> &NoteAudit {
        &self.audit
    }

    pub fn syllabus(&self) -> &SyllabusChecklist {
        &self.syllabus
    }

    pub fn sync_error(&self) -> Option<&str> {
        self.sync_error.as_deref()
    }

    pub fn sync_notice(&self) -> Option<&str> {
        self.sync_notice
    }

    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_guard.is_busy()
    }

    pub fn last_sync_label(&self) -> &str {
        self.workflow
            .last_successful_sync
            .as_deref()
            .unwrap_or("Never Synced")
    }

    /// "Connection Verified" line for the workflow panel, shown only after a
    /// sync has succeeded and no error is pending.
    pub fn connection_status(&self) -> Option<String> {
        if self.sync_error.is_some() {
            return None;
        }
        self.workflow
            .last_successful_sync
            .as_deref()
            .map(|stamp| format!("Connection Verified • {stamp}"))
    }

    fn commit(&mut self) {
        match self.store.save(&self.workflow) {
            Ok(()) => self.persist_error = None,
            Err(err) => {
                warn!(error = %err, "failed to persist workflow config");
                self.persist_error = Some(err.to_string());
            }
        }
    }

    pub fn set_webhook_url(&mut self, url: String) {
        self.workflow.webhook_url = url;
        self.commit();
    }

    pub fn toggle_auto_sync(&mut self) {
        self.workflow.is_auto_sync = !self.workflow.is_auto_sync;
        self.commit();
    }

    /// Replaces the stored URL with one given on the command line.
    pub fn seed_webhook_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() && url != self.workflow.webhook_url {
            self.set_webhook_url(url.to_string());
        }
    }

    pub fn begin_sync(&mut self) -> Option<(Ticket, String)> {
        if !self.workflow.has_webhook() {
            self.sync_error = Some(AppError::NotConfigured.to_string());
            return None;
        }
        let ticket = self.sync_guard.begin()?;
        self.sync_error = None;
        self.sync_notice = None;
        Some((ticket, self.workflow.webhook_url.trim().to_string()))
    }

    pub fn startup_sync(&mut self) -> Option<(Ticket, String)> {
        if !self.workflow.should_auto_sync() {
            return None;
        }
        info!("auto-sync on startup");
        self.begin_sync()
    }

    pub fn finish_sync(&mut self, ticket: Ticket, result: Result<SyncOutcome>) -> bool {
        if !self.sync_guard.finish(ticket) {
            return false;
        }
        match result {
            Ok(outcome) => {
                if outcome.used_fallback {
                    info!("webhook feed is empty; bootstrap question installed");
                    self.sync_notice = Some(EMPTY_FEED_NOTICE);
                }
                self.session.replace_questions(outcome.questions);
                self.workflow.last_successful_sync = Some(outcome.synced_at);
                self.sync_error = None;
                self.commit();
            }
            Err(err) => {
                warn!(error = %err, "sync failed; keeping current questions");
                self.sync_error = Some(err.to_string());
            }
        }
        true
    }

    /// Switches panels. Work owned by the panel being left is cancelled and
    /// the cancelled tickets are returned so the caller can abort the tasks.
    pub fn select_tab(&mut self, tab: AppTab) -> Vec<Ticket> {
        let mut cancelled = Vec::new();
        if tab != self.active_tab {
            match self.active_tab {
                AppTab::CurrentAffairs => cancelled.extend(self.chat.cancel()),
                AppTab::ImageAnalyze => cancelled.extend(self.audit.cancel()),
                _ => {}
            }
        }
        self.active_tab = tab;
        cancelled
    }

    pub fn select_option(&mut self, option: usize) -> SelectOutcome {
        self.session.select_option(option)
    }

    pub fn next_question(&mut self) {
        self.session.advance();
    }

    pub fn set_search_query(&mut self, query: String) {
        self.chat.set_query(query);
    }

    pub fn submit_search(&mut self) -> Option<(Ticket, String)> {
        self.chat.submit()
    }

    pub fn finish_search(&mut self, ticket: Ticket, result: Result<GroundedAnswer>) -> bool {
        self.chat.complete(ticket, result)
    }

    pub fn select_image(&mut self, file_name: String, image: ImageInput) -> Option<Ticket> {
        self.audit.select(file_name, image)
    }

    pub fn fail_image_upload(&mut self, err: &AppError) {
        warn!(error = %err, "could not load image");
        self.audit.fail_upload(err.to_string());
    }

    pub fn discard_image(&mut self) -> Option<Ticket> {
        self.audit.discard()
    }

    pub fn begin_audit(&mut self) -> Option<(Ticket, ImageInput)> {
        self.audit.begin()
    }

    pub fn finish_audit(&mut self, ticket: Ticket, result: Result<String>) -> bool {
        self.audit.complete(ticket, result)
    }

    pub fn toggle_syllabus(&mut self, track: SyllabusTrack, topic: usize) {
        self.syllabus.toggle(track, topic);
    }
}
