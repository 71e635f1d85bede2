//! Flow document (DOCX) extraction
//!
//! Paragraph texts in document order, one per line. Table cell text is
//! flattened in row order. Legacy .doc files share this path; docx-rs
//! rejects them as unreadable, which fails the unit with a corrupt-document
//! error rather than silently producing empty text.

use std::path::Path;

use super::{ExtractError, TextExtractor};

pub struct DocxExtractor;

#[async_trait::async_trait]
impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || extract_docx_text(&path))
            .await
            .map_err(|e| ExtractError::Internal(format!("extraction task failed: {e}")))?
    }
}

fn extract_docx_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;

    let doc = docx_rs::read_docx(&bytes).map_err(|e| {
        ExtractError::CorruptDocument(format!("Error processing Word document: {e}"))
    })?;

    let mut text = String::new();
    for child in &doc.document.children {
        append_document_child(child, &mut text);
    }

    Ok(text.trim().to_string())
}

/// Walk one top-level document element, appending its text
fn append_document_child(element: &docx_rs::DocumentChild, output: &mut String) {
    match element {
        docx_rs::DocumentChild::Paragraph(para) => {
            append_paragraph(para, output);
            output.push('\n');
        }
        docx_rs::DocumentChild::Table(table) => {
            for row in &table.rows {
                let docx_rs::TableChild::TableRow(tr) = row;
                for cell in &tr.cells {
                    let docx_rs::TableRowChild::TableCell(tc) = cell;
                    for content in &tc.children {
                        if let docx_rs::TableCellContent::Paragraph(para) = content {
                            append_paragraph(para, output);
                            output.push('\n');
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn append_paragraph(para: &docx_rs::Paragraph, output: &mut String) {
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => append_run(run, output),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for nested in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = nested {
                        append_run(run, output);
                    }
                }
            }
            _ => {}
        }
    }
}

fn append_run(run: &docx_rs::Run, output: &mut String) {
    for child in &run.children {
        if let docx_rs::RunChild::Text(text) = child {
            output.push_str(&text.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn garbage_bytes_fail_as_corrupt_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a zip container at all").unwrap();

        let err = DocxExtractor.extract(file.path()).await.unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)), "{err}");
    }
}
