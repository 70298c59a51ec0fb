use async_trait::async_trait;

use crate::error::Result;

/// Instruction sent with every uploaded note.
pub const NOTE_AUDIT_INSTRUCTION: &str =
    "Perform a high-level audit of this for UPSC/BPSC curriculum. Check for errors.";

pub const SEARCH_FALLBACK_TEXT: &str = "I'm sorry, I couldn't generate a response.";
pub const ANALYSIS_FALLBACK_TEXT: &str = "Failed to analyze image.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingSource {
    pub title: Option<String>,
    pub uri: String,
}

impl GroundingSource {
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or("Source")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedAnswer {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageInput {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = sniff_image_mime(&bytes).to_string();
        Self { bytes, mime_type }
    }
}

/// Picks the MIME type from the file signature, defaulting to JPEG.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// The generative-AI calls the study panels make. Implementations are
/// stateless; each call is one round trip.
#[async_trait]
pub trait StudyAssistant: Send + Sync {
    async fn grounded_search(&self, query: &str) -> Result<GroundedAnswer>;
    async fn analyze_image(&self, image: &ImageInput, instruction: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_signatures() {
        assert_eq!(sniff_image_mime(&[0x89, b'P', b'N', b'G', 0x0d]), "image/png");
        assert_eq!(sniff_image_mime(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_image_mime(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_image_mime(&[0xff, 0xd8, 0xff, 0xe0]), "image/jpeg");
        assert_eq!(sniff_image_mime(&[]), "image/jpeg");
    }

    #[test]
    fn source_label_falls_back() {
        let untitled = GroundingSource {
            title: None,
            uri: "https://pib.gov.in".to_string(),
        };
        assert_eq!(untitled.label(), "Source");
        let titled = GroundingSource {
            title: Some("PIB".to_string()),
            uri: "https://pib.gov.in".to_string(),
        };
        assert_eq!(titled.label(), "PIB");
    }
}
