//! Editor workspace
//!
//! Holds the uploaded files and the page order between user actions. Both the
//! browser session and the CLI drive edits through this type.

use crate::command::{ExportMetrics, ExportResult, PageCommand};
use crate::error::PdfEditError;
use crate::export::export_pages;
use crate::page_info::PageInfo;
use crate::page_order::{PageOrder, PageRef};
use crate::validation::{load_validated, PdfInfo};
use lopdf::Document;
use serde::Serialize;
use tracing::{debug, info};

/// An uploaded PDF, kept untouched until export
struct SourceDocument {
    name: String,
    bytes: Vec<u8>,
    document: Document,
    info: PdfInfo,
}

/// What the file list shows for an uploaded document
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentSummary {
    pub index: usize,
    pub name: String,
    pub page_count: u32,
    pub size_bytes: usize,
    pub version: String,
    pub title: Option<String>,
}

#[derive(Default)]
pub struct EditorWorkspace {
    sources: Vec<SourceDocument>,
    order: PageOrder,
}

impl EditorWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a document; its pages are appended to the order
    pub fn add_document(&mut self, name: &str, bytes: &[u8]) -> Result<DocumentSummary, PdfEditError> {
        let (document, info) = load_validated(bytes)?;
        if info.encrypted {
            return Err(PdfEditError::Unsupported(format!(
                "{} is encrypted and cannot be edited",
                name
            )));
        }

        let index = self.sources.len();
        self.order.append_document(index, info.page_count);
        self.sources.push(SourceDocument {
            name: name.to_string(),
            bytes: bytes.to_vec(),
            document,
            info,
        });

        info!(
            name,
            index,
            pages = self.sources[index].info.page_count,
            "added document"
        );
        Ok(self.summary(index))
    }

    /// Remove a document and every page of it from the order
    pub fn remove_document(&mut self, index: usize) -> Result<(), PdfEditError> {
        if index >= self.sources.len() {
            return Err(PdfEditError::UnknownDocument(index));
        }
        let removed = self.sources.remove(index);
        self.order.remove_document(index);
        debug!(name = %removed.name, index, "removed document");
        Ok(())
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), PdfEditError> {
        self.order.move_page(from, to)
    }

    pub fn delete_page(&mut self, position: usize) -> Result<PageRef, PdfEditError> {
        self.order.delete_page(position)
    }

    pub fn rotate_page(&mut self, position: usize, degrees: i32) -> Result<i32, PdfEditError> {
        self.order.rotate_page(position, degrees)
    }

    pub fn reorder(&mut self, new_order: &[usize]) -> Result<(), PdfEditError> {
        self.order.reorder(new_order)
    }

    pub fn apply_commands(&mut self, commands: &[PageCommand]) -> Result<(), PdfEditError> {
        self.order.apply_all(commands)?;
        debug!(count = commands.len(), pages = self.order.len(), "applied commands");
        Ok(())
    }

    /// Which source page the canvas should render at `position`
    pub fn preview_target(&self, position: usize) -> Result<PageRef, PdfEditError> {
        self.order.get(position).copied()
    }

    /// Page geometry at a display position, including editor rotation
    pub fn page_info(&self, position: usize) -> Result<PageInfo, PdfEditError> {
        let entry = self.order.get(position)?;
        let source = self
            .sources
            .get(entry.doc)
            .ok_or(PdfEditError::UnknownDocument(entry.doc))?;
        Ok(PageInfo::from_document(&source.document, entry.page)?.rotated(entry.rotation))
    }

    pub fn document_bytes(&self, index: usize) -> Result<&[u8], PdfEditError> {
        self.sources
            .get(index)
            .map(|s| s.bytes.as_slice())
            .ok_or(PdfEditError::UnknownDocument(index))
    }

    pub fn documents(&self) -> Vec<DocumentSummary> {
        (0..self.sources.len()).map(|i| self.summary(i)).collect()
    }

    pub fn document_count(&self) -> usize {
        self.sources.len()
    }

    pub fn order(&self) -> &PageOrder {
        &self.order
    }

    pub fn page_count(&self) -> usize {
        self.order.len()
    }

    pub fn can_export(&self) -> bool {
        !self.order.is_empty()
    }

    /// Build the output PDF from the current order
    pub fn export(&self) -> Result<ExportResult, PdfEditError> {
        let sources: Vec<Vec<u8>> = self.sources.iter().map(|s| s.bytes.clone()).collect();
        let bytes = export_pages(&sources, &self.order)?;

        let metrics = ExportMetrics {
            input_size_bytes: self.sources.iter().map(|s| s.bytes.len()).sum(),
            output_size_bytes: bytes.len(),
            page_count: self.order.len() as u32,
        };
        info!(
            pages = metrics.page_count,
            bytes = metrics.output_size_bytes,
            "exported document"
        );
        Ok(ExportResult { bytes, metrics })
    }

    fn summary(&self, index: usize) -> DocumentSummary {
        let source = &self.sources[index];
        DocumentSummary {
            index,
            name: source.name.clone(),
            page_count: source.info.page_count,
            size_bytes: source.bytes.len(),
            version: source.info.version.clone(),
            title: source.info.title.clone(),
        }
    }
}
