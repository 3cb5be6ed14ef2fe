//! Stateful editor session
//!
//! Holds the uploaded documents and the page order in Rust memory. JavaScript
//! forwards drag-reorder results and button clicks here and asks back what to
//! render; it never tracks page state itself.

use pdfedit_core::{parse_commands, EditorWorkspace, PageCommand, PdfEditError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct EditorSession {
    workspace: EditorWorkspace,
    progress_callback: Option<js_sys::Function>,
}

/// What the thumbnail canvas should draw for one display position
#[derive(Debug, Clone, Serialize, PartialEq)]
struct PreviewTarget {
    position: usize,
    doc: usize,
    /// 1-based, as PDF.js `getPage` expects
    page: u32,
    rotation: i32,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn js_error(error: PdfEditError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl EditorSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            workspace: EditorWorkspace::new(),
            progress_callback: None,
        }
    }

    /// Callback signature: (current: number, total: number, message: string) => void
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Add an uploaded file; its pages are appended after the current ones
    #[wasm_bindgen(js_name = addDocument)]
    pub fn add_document(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let summary = self
            .workspace
            .add_document(name, bytes)
            .map_err(js_error)?;
        web_sys::console::log_1(&JsValue::from_str(&format!(
            "Added {} ({} pages)",
            summary.name, summary.page_count
        )));
        to_js(&summary)
    }

    #[wasm_bindgen(js_name = removeDocument)]
    pub fn remove_document(&mut self, index: usize) -> Result<(), JsValue> {
        self.workspace.remove_document(index).map_err(js_error)
    }

    /// Apply a drag-reorder: the page at `from` now sits at `to`
    #[wasm_bindgen(js_name = movePage)]
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.workspace.move_page(from, to).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deletePage)]
    pub fn delete_page(&mut self, position: usize) -> Result<(), JsValue> {
        self.workspace.delete_page(position).map(|_| ()).map_err(js_error)
    }

    /// Delete display positions given as a 1-based range string ("2, 4-6")
    #[wasm_bindgen(js_name = deletePages)]
    pub fn delete_pages(&mut self, range: &str) -> Result<usize, JsValue> {
        self.delete_pages_internal(range).map_err(js_error)
    }

    #[wasm_bindgen(js_name = rotatePage)]
    pub fn rotate_page(&mut self, position: usize, degrees: i32) -> Result<i32, JsValue> {
        self.workspace.rotate_page(position, degrees).map_err(js_error)
    }

    /// new_order is an array of current positions in the desired new order
    #[wasm_bindgen(js_name = reorderPages)]
    pub fn reorder_pages(&mut self, new_order: &[usize]) -> Result<(), JsValue> {
        self.workspace.reorder(new_order).map_err(js_error)
    }

    /// Apply a JSON array of page commands atomically
    #[wasm_bindgen(js_name = applyCommands)]
    pub fn apply_commands(&mut self, json: &str) -> Result<(), JsValue> {
        let commands = parse_commands(json).map_err(js_error)?;
        self.workspace.apply_commands(&commands).map_err(js_error)
    }

    /// Current order as [{doc, page, rotation}, ...]
    #[wasm_bindgen(js_name = getPageOrder)]
    pub fn get_page_order(&self) -> Result<JsValue, JsValue> {
        to_js(&self.workspace.order().entries())
    }

    #[wasm_bindgen(js_name = getPreviewTarget)]
    pub fn get_preview_target(&self, position: usize) -> Result<JsValue, JsValue> {
        to_js(&self.preview_target_internal(position).map_err(js_error)?)
    }

    /// Raw bytes of an uploaded file, for PDF.js rendering
    #[wasm_bindgen(js_name = getDocumentBytes)]
    pub fn get_document_bytes(&self, index: usize) -> Result<js_sys::Uint8Array, JsValue> {
        let bytes = self.workspace.document_bytes(index).map_err(js_error)?;
        Ok(js_sys::Uint8Array::from(bytes))
    }

    #[wasm_bindgen(js_name = getPageInfo)]
    pub fn get_page_info(&self, position: usize) -> Result<JsValue, JsValue> {
        to_js(&self.workspace.page_info(position).map_err(js_error)?)
    }

    #[wasm_bindgen(js_name = getDocumentInfos)]
    pub fn get_document_infos(&self) -> Result<JsValue, JsValue> {
        to_js(&self.workspace.documents())
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.workspace.page_count()
    }

    #[wasm_bindgen(getter, js_name = documentCount)]
    pub fn document_count(&self) -> usize {
        self.workspace.document_count()
    }

    #[wasm_bindgen(js_name = canExport)]
    pub fn can_export(&self) -> bool {
        self.workspace.can_export()
    }

    /// Build the edited PDF and return it as a Uint8Array for download
    pub fn export(&self) -> Result<js_sys::Uint8Array, JsValue> {
        self.report_progress(0, 100, "Starting...");
        let result = self.export_internal().map_err(js_error)?;
        self.report_progress(100, 100, "Complete");

        Ok(js_sys::Uint8Array::from(result.as_slice()))
    }
}

impl EditorSession {
    fn delete_pages_internal(&mut self, range: &str) -> Result<usize, PdfEditError> {
        let before = self.workspace.page_count();
        let command = PageCommand::DeleteRange {
            range: range.to_string(),
        };
        self.workspace.apply_commands(&[command])?;
        Ok(before - self.workspace.page_count())
    }

    fn preview_target_internal(&self, position: usize) -> Result<PreviewTarget, PdfEditError> {
        let entry = self.workspace.preview_target(position)?;
        Ok(PreviewTarget {
            position,
            doc: entry.doc,
            page: entry.page,
            rotation: entry.rotation,
        })
    }

    fn export_internal(&self) -> Result<Vec<u8>, PdfEditError> {
        if !self.workspace.can_export() {
            return Err(PdfEditError::OperationError("No pages to export".into()));
        }
        self.report_progress(10, 100, "Assembling pages...");
        let result = self.workspace.export()?;
        self.report_progress(90, 100, "Finalizing...");
        Ok(result.bytes)
    }

    fn report_progress(&self, current: u32, total: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            let _ = callback.call3(
                &JsValue::null(),
                &JsValue::from(current),
                &JsValue::from(total),
                &JsValue::from_str(message),
            );
        }
    }
}


#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::tests::create_test_pdf;
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_add_document_returns_summary() {
        let mut session = EditorSession::new();
        let summary = session.add_document("a.pdf", &create_test_pdf(2)).unwrap();
        let count = js_sys::Reflect::get(&summary, &JsValue::from_str("page_count")).unwrap();
        assert_eq!(count.as_f64(), Some(2.0));
        assert!(session.add_document("bad.pdf", b"not a pdf").is_err());
    }

    #[wasm_bindgen_test]
    fn test_page_order_crosses_the_boundary() {
        let mut session = EditorSession::new();
        session.add_document("a.pdf", &create_test_pdf(3)).unwrap();
        session.move_page(0, 2).unwrap();
        assert_eq!(session.rotate_page(0, 90).unwrap(), 90);

        let order: js_sys::Array = session.get_page_order().unwrap().into();
        assert_eq!(order.length(), 3);
        let first = order.get(0);
        let page = js_sys::Reflect::get(&first, &JsValue::from_str("page")).unwrap();
        let rotation = js_sys::Reflect::get(&first, &JsValue::from_str("rotation")).unwrap();
        assert_eq!(page.as_f64(), Some(2.0));
        assert_eq!(rotation.as_f64(), Some(90.0));

        assert!(session.delete_pages("1-4294967295").is_err());
        assert_eq!(session.page_count(), 3);
    }

    #[wasm_bindgen_test]
    fn test_export_reports_progress() {
        let mut session = EditorSession::new();
        session.add_document("a.pdf", &create_test_pdf(2)).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let callback = Closure::<dyn FnMut(u32, u32, String)>::new(
            move |current: u32, _total: u32, _message: String| sink.borrow_mut().push(current),
        );
        session.set_progress_callback(callback.as_ref().unchecked_ref::<js_sys::Function>().clone());

        let bytes = session.export().unwrap().to_vec();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(*seen.borrow(), vec![0, 10, 90, 100]);
    }

    #[wasm_bindgen_test]
    fn test_export_empty_session_fails() {
        let session = EditorSession::new();
        assert!(!session.can_export());
        assert!(session.export().is_err());
    }
}
