//! WASM bindings for the browser PDF page editor
//!
//! State lives in Rust via `EditorSession`; JavaScript only handles DOM
//! events, file I/O, drag-reorder and canvas rendering with PDF.js.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { EditorSession } from './pkg/pdfedit_wasm.js';
//!
//! await init();
//!
//! const session = new EditorSession();
//! session.addDocument("a.pdf", bytesA);
//! session.addDocument("b.pdf", bytesB);      // merged after a.pdf's pages
//! session.movePage(evt.oldIndex, evt.newIndex); // from the drag library
//! session.deletePage(2);
//! const target = session.getPreviewTarget(0); // {doc, page, rotation}
//! pdfjs.getDocument(session.getDocumentBytes(target.doc));
//! downloadBlob(session.export(), "edited.pdf");
//! ```

pub mod session;

use wasm_bindgen::prelude::*;

pub use session::EditorSession;

/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Header/trailer check before reading a file into a session
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    pdfedit_core::quick_validate(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Detailed PDF info without creating a session
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = pdfedit_core::validate_pdf(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
