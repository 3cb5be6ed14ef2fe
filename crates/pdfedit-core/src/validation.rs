//! Upload validation
//!
//! Cheap checks run before a file joins the editor, plus basic metadata for
//! the file list.

use crate::error::PdfEditError;
use lopdf::{Document, Object};
use serde::Serialize;

/// Minimum plausible size: "%PDF-1.x" alone is 8 bytes
const MIN_PDF_SIZE: usize = 8;

/// How far from the end we look for the %%EOF marker
const EOF_SEARCH_WINDOW: usize = 1024;

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PdfInfo {
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    pub valid: bool,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Header and trailer checks only, without parsing
pub fn quick_validate(bytes: &[u8]) -> Result<(), PdfEditError> {
    check_header(bytes)?;

    let tail = &bytes[bytes.len().saturating_sub(EOF_SEARCH_WINDOW)..];
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(PdfEditError::ParseError(
            "PDF appears truncated (missing %%EOF marker)".into(),
        ));
    }

    Ok(())
}

/// Parse the document and collect what the file list shows
pub fn validate_pdf(bytes: &[u8]) -> Result<PdfInfo, PdfEditError> {
    load_validated(bytes).map(|(_, info)| info)
}

/// Parse once and return the document together with its info, for callers
/// that keep the parsed document around
pub fn load_validated(bytes: &[u8]) -> Result<(Document, PdfInfo), PdfEditError> {
    check_header(bytes)?;

    let document =
        Document::load_mem(bytes).map_err(|e| PdfEditError::ParseError(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PdfEditError::Unsupported("PDF has no pages".into()));
    }

    let info = PdfInfo {
        page_count,
        version: extract_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        valid: true,
        title: info_string(&document, b"Title"),
        author: info_string(&document, b"Author"),
    };
    Ok((document, info))
}

fn check_header(bytes: &[u8]) -> Result<(), PdfEditError> {
    if bytes.len() < MIN_PDF_SIZE {
        return Err(PdfEditError::ParseError(
            "File too small to be a valid PDF".into(),
        ));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfEditError::ParseError(
            "Not a valid PDF file (missing %PDF- header)".into(),
        ));
    }
    Ok(())
}

/// Header format: %PDF-1.7
fn extract_version(bytes: &[u8]) -> String {
    bytes
        .get(5..8)
        .and_then(|v| std::str::from_utf8(v).ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "1.4".to_string())
}

/// Read a text entry from the trailer's Info dictionary
fn info_string(document: &Document, key: &[u8]) -> Option<String> {
    let info_id = document.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    let info = document.get_object(info_id).and_then(Object::as_dict).ok()?;
    let raw = info.get(key).and_then(Object::as_str).ok()?;

    let decoded = String::from_utf8_lossy(raw).into_owned();
    (!decoded.is_empty()).then_some(decoded)
}
