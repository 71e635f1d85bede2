//! Slide deck (PPTX) extraction
//!
//! A .pptx file is an OOXML zip container; slide content lives in
//! `ppt/slides/slideN.xml`. Slides are visited in their stored (numeric)
//! order, and within each slide the `<a:t>` text runs are appended in
//! document order. Shapes without text contribute nothing and are skipped
//! silently.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

use super::{ExtractError, TextExtractor};

pub struct PptxExtractor;

#[async_trait::async_trait]
impl TextExtractor for PptxExtractor {
    fn name(&self) -> &'static str {
        "pptx"
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || extract_pptx_text(&path))
            .await
            .map_err(|e| ExtractError::Internal(format!("extraction task failed: {e}")))?
    }
}

fn extract_pptx_text(path: &Path) -> Result<String, ExtractError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        ExtractError::CorruptDocument(format!("Error processing PowerPoint: {e}"))
    })?;

    // Slide entries are not guaranteed to be stored in presentation order
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    let mut text = String::new();
    for (_, name) in slides {
        let mut xml = String::new();
        archive
            .by_name(&name)
            .map_err(|e| {
                ExtractError::CorruptDocument(format!("Error processing PowerPoint: {e}"))
            })?
            .read_to_string(&mut xml)?;

        append_slide_text(&xml, &mut text)?;
    }

    Ok(text.trim().to_string())
}

/// Extract N from "ppt/slides/slideN.xml"
fn slide_number(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("ppt/slides/slide")?;
    let digits = rest.strip_suffix(".xml")?;
    digits.parse().ok()
}

/// Append the text runs of one slide, one line per paragraph
fn append_slide_text(xml: &str, output: &mut String) -> Result<(), ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"a:t" => in_text_run = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"a:t" => in_text_run = false,
            // Paragraph boundary within a shape's text body
            Ok(Event::End(ref e)) if e.name().as_ref() == b"a:p" => {
                if !output.ends_with('\n') && !output.is_empty() {
                    output.push('\n');
                }
            }
            Ok(Event::Text(e)) if in_text_run => {
                let run = e.unescape().map_err(|e| {
                    ExtractError::CorruptDocument(format!("Error processing PowerPoint: {e}"))
                })?;
                output.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::CorruptDocument(format!(
                    "Error processing PowerPoint: {e}"
                )))
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    /// Build a minimal two-slide deck in memory
    pub(crate) fn minimal_pptx(slide_texts: &[&str]) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = FileOptions::default();
            for (i, slide) in slide_texts.iter().enumerate() {
                writer
                    .start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                    .unwrap();
                let xml = format!(
                    r#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><p:txBody><a:p><a:r><a:t>{slide}</a:t></a:r></a:p></p:txBody></p:sld>"#
                );
                writer.write_all(xml.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[tokio::test]
    async fn slides_are_read_in_stored_order() {
        let bytes = minimal_pptx(&["First slide", "Second slide"]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let text = PptxExtractor.extract(file.path()).await.unwrap();
        assert_eq!(text, "First slide\nSecond slide");
    }

    #[tokio::test]
    async fn garbage_bytes_fail_as_corrupt_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"no zip magic here").unwrap();

        let err = PptxExtractor.extract(file.path()).await.unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument(_)), "{err}");
    }

    #[test]
    fn slide_number_parses_only_slide_entries() {
        assert_eq!(slide_number("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_number("ppt/slides/slide1.xml"), Some(1));
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
        assert_eq!(slide_number("ppt/slides/slide.xml"), None);
    }
}
