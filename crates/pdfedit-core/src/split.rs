//! PDF Split
//!
//! Extracts a set of pages from one PDF, keeping their original order.

use crate::error::PdfEditError;
use crate::export::export_pages;
use crate::page_order::{PageOrder, PageRef};
use lopdf::Document;
use std::collections::BTreeSet;

/// Split a PDF, extracting only the specified pages (1-indexed)
pub fn split_document(bytes: &[u8], pages: Vec<u32>) -> Result<Vec<u8>, PdfEditError> {
    if pages.is_empty() {
        return Err(PdfEditError::InvalidRange("No pages specified".into()));
    }

    if pages.contains(&0) {
        return Err(PdfEditError::InvalidRange(
            "Page numbers must be >= 1".into(),
        ));
    }

    let doc = Document::load_mem(bytes).map_err(|e| PdfEditError::ParseError(e.to_string()))?;
    let page_count = doc.get_pages().len() as u32;

    for &page in &pages {
        if page > page_count {
            return Err(PdfEditError::InvalidRange(format!(
                "Page {} does not exist (document has {} pages)",
                page, page_count
            )));
        }
    }

    let unique: BTreeSet<u32> = pages.into_iter().collect();
    let order = PageOrder::from_entries(unique.into_iter().map(|p| PageRef::new(0, p)).collect())?;

    export_pages(&[bytes.to_vec()], &order)
}
