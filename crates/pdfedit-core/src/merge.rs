//! PDF Merge
//!
//! Combines whole documents, in the given order, into a single document.

use crate::error::PdfEditError;
use crate::export::export_pages;
use crate::page_order::PageOrder;
use lopdf::Document;

/// Merge multiple PDFs into one
///
/// An empty input is an error and a single document is returned as-is.
/// Otherwise every page of every document is appended to one page order and
/// exported.
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfEditError> {
    if documents.is_empty() {
        return Err(PdfEditError::OperationError("No documents to merge".into()));
    }

    if documents.len() == 1 {
        return Ok(documents.into_iter().next().unwrap_or_default());
    }

    let mut order = PageOrder::new();
    for (i, bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(bytes).map_err(|e| {
            PdfEditError::ParseError(format!("Failed to load document {}: {}", i, e))
        })?;
        order.append_document(i, doc.get_pages().len() as u32);
    }

    export_pages(&documents, &order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_pdf, page_markers};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_empty_fails() {
        let result = merge_documents(vec![]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No documents to merge"));
    }

    #[test]
    fn test_merge_single_document_returns_same() {
        let pdf = create_test_pdf(2, "Single");
        let result = merge_documents(vec![pdf.clone()]).unwrap();
        assert_eq!(result, pdf);
    }

    #[test]
    fn test_merge_two_documents_combines_pages() {
        let doc_a = create_test_pdf(2, "DocA");
        let doc_b = create_test_pdf(3, "DocB");

        let merged = merge_documents(vec![doc_a, doc_b]).unwrap();

        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn test_merge_preserves_page_order() {
        let doc1 = create_test_pdf(2, "First");
        let doc2 = create_test_pdf(1, "Second");
        let doc3 = create_test_pdf(2, "Third");

        let merged = merge_documents(vec![doc1, doc2, doc3]).unwrap();

        assert_eq!(
            page_markers(&merged),
            vec![
                "First-Page-1",
                "First-Page-2",
                "Second-Page-1",
                "Third-Page-1",
                "Third-Page-2"
            ]
        );
    }

    #[test]
    fn test_merge_rejects_invalid_input() {
        let doc = create_test_pdf(1, "Valid");
        let err = merge_documents(vec![doc, b"garbage".to_vec()]).unwrap_err();
        assert!(err.to_string().contains("document 1"));
    }
}
