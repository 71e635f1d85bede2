//! Paginated document (PDF) extraction
//!
//! Page texts are concatenated with newline separators by pdf-extract;
//! trailing/leading whitespace is trimmed. The parser is panic-guarded:
//! malformed embedded fonts can panic deep inside glyph handling, and a
//! bad upload must fail the unit, not the worker.

use std::panic::AssertUnwindSafe;
use std::path::Path;

use super::{ExtractError, TextExtractor};

pub struct PdfExtractor;

#[async_trait::async_trait]
impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || extract_pdf_text(&path))
            .await
            .map_err(|e| ExtractError::Internal(format!("extraction task failed: {e}")))?
    }
}

fn extract_pdf_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;

    let text = match std::panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    })) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(ExtractError::CorruptDocument(format!(
                "Error processing PDF: {e}"
            )))
        }
        Err(_) => {
            return Err(ExtractError::CorruptDocument(
                "Error processing PDF: parser panicked on malformed font data".to_string(),
            ))
        }
    };

    Ok(text.trim().to_string())
}
