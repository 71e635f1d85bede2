//! Format-specific text extractors
//!
//! One extractor per supported category. Extractors convert a stored file
//! into plain text or fail with a format-specific error; they never touch
//! persistence or processing status; that is the pipeline's job.

pub mod audio;
pub mod docx;
pub mod pdf;
pub mod pptx;
pub mod transcribe;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::FileCategory;

pub use audio::AudioExtractor;
pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use transcribe::Transcriber;

/// Extraction failure
#[derive(Debug, Error)]
pub enum ExtractError {
    /// I/O error (file read/write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document structure could not be read
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    /// Audio input could not be decoded
    #[error("Audio decode failure: {0}")]
    DecodeFailure(String),

    /// Transcription produced no usable result
    #[error("Unintelligible audio: {0}")]
    UnintelligibleAudio(String),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A format-specific text extraction strategy
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extractor name for logging
    fn name(&self) -> &'static str;

    /// Extract plain text from the file at `path`
    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Registry mapping categories to their extractor
pub struct ExtractorSet {
    pdf: PdfExtractor,
    docx: DocxExtractor,
    pptx: PptxExtractor,
    audio: AudioExtractor,
}

impl ExtractorSet {
    pub fn new(transcriber: Arc<Transcriber>) -> Self {
        Self {
            pdf: PdfExtractor,
            docx: DocxExtractor,
            pptx: PptxExtractor,
            audio: AudioExtractor::new(transcriber),
        }
    }

    /// Look up the extractor for a category
    ///
    /// `Unknown` has no extractor; the pipeline fails such units without
    /// attempting a lookup.
    pub fn for_category(&self, category: FileCategory) -> Option<&dyn TextExtractor> {
        match category {
            FileCategory::Pdf => Some(&self.pdf),
            FileCategory::Docx => Some(&self.docx),
            FileCategory::Pptx => Some(&self.pptx),
            FileCategory::Audio => Some(&self.audio),
            FileCategory::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_has_no_extractor() {
        let set = ExtractorSet::new(Arc::new(Transcriber::disabled()));
        assert!(set.for_category(FileCategory::Unknown).is_none());
        assert!(set.for_category(FileCategory::Pdf).is_some());
        assert!(set.for_category(FileCategory::Docx).is_some());
        assert!(set.for_category(FileCategory::Pptx).is_some());
        assert!(set.for_category(FileCategory::Audio).is_some());
    }
}
