//! Document text extraction.
//!
//! Converts uploaded binary documents to text, one file at a time, before
//! prompt assembly. Extraction failures are per-file and non-fatal: the
//! request handler replaces a failed file with a placeholder note and
//! keeps going.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

/// Maximum number of attached files per request.
pub const MAX_ATTACHMENTS: usize = 10;

/// Maximum size of a single uploaded file (10 MiB).
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME types accepted on upload. Image types are accepted at the
/// transport layer but extraction reports them unsupported (no OCR runs
/// in-process), which surfaces as an inline placeholder note.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    DOCX_MIME,
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "text/plain",
];

/// An uploaded document, held in memory for the life of the request only.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no text extraction available for '{0}'")]
    Unsupported(String),

    #[error("file could not be parsed: {0}")]
    Corrupt(String),
}

/// Text extraction seam. The daemon ships [`DocumentExtractor`]; tests
/// substitute their own.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError>;
}

/// Extractor for the supported document formats.
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        match file.mime.as_str() {
            "text/plain" => Ok(String::from_utf8_lossy(&file.data).into_owned()),
            "application/pdf" => pdf_extract::extract_text_from_mem(&file.data)
                .map_err(|e| ExtractError::Corrupt(e.to_string())),
            DOCX_MIME => extract_docx(&file.data),
            other => Err(ExtractError::Unsupported(other.to_string())),
        }
    }
}

/// Pull paragraph text out of the `word/document.xml` entry of a DOCX
/// archive. Only `w:t` runs carry text; paragraph ends become newlines.
fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let cursor = std::io::Cursor::new(data);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| ExtractError::Corrupt(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Corrupt(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Corrupt(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text_run => {
                let run = e
                    .unescape()
                    .map_err(|err| ExtractError::Corrupt(err.to_string()))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Corrupt(e.to_string())),
            _ => {}
        }
    }

    Ok(text.trim_end().to_string())
}

/// Extract all attachments in input order into one labeled block.
///
/// A failed file becomes a placeholder note; the others are unaffected.
/// Returns `None` when there are no attachments.
pub fn extract_all(extractor: &dyn TextExtractor, files: &[UploadedFile]) -> Option<String> {
    if files.is_empty() {
        return None;
    }

    let sections: Vec<String> = files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let label = format!("[Document {}: {}]", index + 1, file.name);
            match extractor.extract(file) {
                Ok(text) => format!("{}\n{}", label, text.trim()),
                Err(e) => {
                    tracing::warn!("[X]  Extraction failed for '{}': {}", file.name, e);
                    format!(
                        "{}\n[No text could be extracted from this file: unsupported or unreadable]",
                        label
                    )
                }
            }
        })
        .collect();

    Some(sections.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn text_file(name: &str, content: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime: "text/plain".to_string(),
            data: content.as_bytes().to_vec(),
        }
    }

    /// Build a minimal in-memory DOCX archive with the given paragraphs.
    fn docx_file(name: &str, paragraphs: &[&str]) -> UploadedFile {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
            .collect();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{}</w:body></w:document>"#,
            body
        );

        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        UploadedFile {
            name: name.to_string(),
            mime: DOCX_MIME.to_string(),
            data: buffer.into_inner(),
        }
    }

    #[test]
    fn test_plain_text_passthrough() {
        let extractor = DocumentExtractor;
        let text = extractor
            .extract(&text_file("note.txt", "hearing on Monday"))
            .unwrap();
        assert_eq!(text, "hearing on Monday");
    }

    #[test]
    fn test_image_is_unsupported() {
        let extractor = DocumentExtractor;
        let file = UploadedFile {
            name: "scan.png".to_string(),
            mime: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        };
        assert!(matches!(
            extractor.extract(&file),
            Err(ExtractError::Unsupported(_))
        ));
    }

    #[test]
    fn test_docx_extraction() {
        let extractor = DocumentExtractor;
        let file = docx_file("petition.docx", &["IN THE HIGH COURT", "Petition under Section 438"]);
        let text = extractor.extract(&file).unwrap();
        assert_eq!(text, "IN THE HIGH COURT\nPetition under Section 438");
    }

    #[test]
    fn test_corrupt_docx_reports_error() {
        let extractor = DocumentExtractor;
        let file = UploadedFile {
            name: "broken.docx".to_string(),
            mime: DOCX_MIME.to_string(),
            data: b"not a zip archive".to_vec(),
        };
        assert!(matches!(
            extractor.extract(&file),
            Err(ExtractError::Corrupt(_))
        ));
    }

    #[test]
    fn test_extract_all_empty_input() {
        assert!(extract_all(&DocumentExtractor, &[]).is_none());
    }

    #[test]
    fn test_extract_all_preserves_order_and_labels() {
        let files = vec![
            text_file("first.txt", "alpha"),
            text_file("second.txt", "beta"),
        ];
        let block = extract_all(&DocumentExtractor, &files).unwrap();
        let first = block.find("[Document 1: first.txt]\nalpha").unwrap();
        let second = block.find("[Document 2: second.txt]\nbeta").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_one_failure_does_not_abort_the_batch() {
        let files = vec![
            text_file("good.txt", "usable text"),
            UploadedFile {
                name: "scan.jpg".to_string(),
                mime: "image/jpeg".to_string(),
                data: vec![0xff, 0xd8],
            },
            text_file("also-good.txt", "more text"),
        ];
        let block = extract_all(&DocumentExtractor, &files).unwrap();
        assert!(block.contains("[Document 1: good.txt]\nusable text"));
        assert!(block.contains("[Document 2: scan.jpg]\n[No text could be extracted"));
        assert!(block.contains("[Document 3: also-good.txt]\nmore text"));
    }
}
