use tracing::warn;

use crate::app::tasks::{OperationKind, TaskGuard, Ticket};
use crate::error::Result;
use crate::interfaces::assistant::ImageInput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub file_name: String,
    pub image: ImageInput,
}

/// The note-audit panel: one uploaded image and the latest report on it.
#[derive(Debug, Clone)]
pub struct NoteAudit {
    selected: Option<SelectedImage>,
    report: Option<String>,
    error: Option<String>,
    guard: TaskGuard,
}

impl Default for NoteAudit {
    fn default() -> Self {
        Self {
            selected: None,
            report: None,
            error: None,
            guard: TaskGuard::new(OperationKind::ImageAudit),
        }
    }
}

impl NoteAudit {
    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.guard.is_busy()
    }

    /// Installs a new image. Any audit still running on the previous one is
    /// cancelled and its ticket returned.
    pub fn select(&mut self, file_name: String, image: ImageInput) -> Option<Ticket> {
        let cancelled = self.guard.cancel();
        self.selected = Some(SelectedImage { file_name, image });
        self.report = None;
        self.error = None;
        cancelled
    }

    pub fn discard(&mut self) -> Option<Ticket> {
        let cancelled = self.guard.cancel();
        self.selected = None;
        self.report = None;
        self.error = None;
        cancelled
    }

    pub fn fail_upload(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn begin(&mut self) -> Option<(Ticket, ImageInput)> {
        let image = self.selected.as_ref()?.image.clone();
        let ticket = self.guard.begin()?;
        self.error = None;
        Some((ticket, image))
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<String>) -> bool {
        if !self.guard.finish(ticket) {
            return false;
        }
        match result {
            Ok(report) => self.report = Some(report),
            Err(err) => {
                warn!(error = %err, "note audit failed");
                self.error = Some(err.to_string());
            }
        }
        true
    }

    pub fn cancel(&mut self) -> Option<Ticket> {
        self.guard.cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn jpeg() -> ImageInput {
        ImageInput::from_bytes(vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3])
    }

    #[test]
    fn begin_requires_an_image() {
        let mut audit = NoteAudit::default();
        assert!(audit.begin().is_none());
        audit.select("notes.jpg".to_string(), jpeg());
        let (_ticket, image) = audit.begin().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(audit.is_analyzing());
        assert!(audit.begin().is_none());
    }

    #[test]
    fn failure_clears_busy_flag_and_records_error() {
        let mut audit = NoteAudit::default();
        audit.select("notes.jpg".to_string(), jpeg());
        let (ticket, _) = audit.begin().unwrap();
        assert!(audit.complete(ticket, Err(AppError::Http("503".to_string()))));
        assert!(!audit.is_analyzing());
        assert!(audit.error().unwrap().contains("503"));
        assert_eq!(audit.report(), None);
    }

    #[test]
    fn selecting_during_audit_returns_running_ticket() {
        let mut audit = NoteAudit::default();
        assert_eq!(audit.select("first.jpg".to_string(), jpeg()), None);
        let (ticket, _) = audit.begin().unwrap();

        assert_eq!(audit.select("second.jpg".to_string(), jpeg()), Some(ticket));
        assert!(!audit.is_analyzing());
        assert!(!audit.complete(ticket, Ok("about first.jpg".to_string())));
        assert_eq!(audit.report(), None);
        assert_eq!(audit.selected().unwrap().file_name, "second.jpg");
    }

    #[test]
    fn discard_cancels_and_drops_late_report() {
        let mut audit = NoteAudit::default();
        audit.select("notes.jpg".to_string(), jpeg());
        let (ticket, _) = audit.begin().unwrap();
        assert_eq!(audit.discard(), Some(ticket));
        assert!(!audit.complete(ticket, Ok("late".to_string())));
        assert!(audit.selected().is_none());
        assert_eq!(audit.report(), None);
    }

    #[test]
    fn success_stores_report() {
        let mut audit = NoteAudit::default();
        audit.select("notes.jpg".to_string(), jpeg());
        let (ticket, _) = audit.begin().unwrap();
        assert!(audit.complete(ticket, Ok("Polity notes look accurate.".to_string())));
        assert_eq!(audit.report(), Some("Polity notes look accurate."));
    }
}
