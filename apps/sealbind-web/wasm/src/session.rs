//! Stateful sealing session for the browser
//!
//! Holds the stamp, document and slice state in Rust; JavaScript only
//! handles DOM events and hands the result bytes to a download.

use crate::validation::{validate_pdf, validate_stamp, PdfInfo};
use sealbind_core::SealSession;
use wasm_bindgen::prelude::*;

/// Stateful straddle-seal session exposed to JavaScript
#[wasm_bindgen]
pub struct SealBindSession {
    inner: SealSession,
    document_name: Option<String>,
    progress_callback: Option<js_sys::Function>,
}

impl Default for SealBindSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SealBindSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: SealSession::new(),
            document_name: None,
            progress_callback: None,
        }
    }

    /// Set a progress callback function
    /// Callback signature: (current: number, total: number, message: string) => void
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Internal method to load a stamp (testable without JsValue)
    fn add_stamp_internal(&mut self, bytes: &[u8]) -> Result<(), String> {
        validate_stamp(bytes)?;
        self.inner.load_stamp(bytes).map_err(|e| e.to_string())
    }

    /// Load (or replace) the seal image from PNG bytes
    #[wasm_bindgen(js_name = addStamp)]
    pub fn add_stamp(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.add_stamp_internal(bytes)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Internal method to load a document (testable without JsValue)
    fn add_document_internal(&mut self, name: &str, bytes: &[u8]) -> Result<PdfInfo, String> {
        let info = validate_pdf(bytes)?;
        self.inner.load_document(bytes).map_err(|e| e.to_string())?;
        self.document_name = Some(name.to_string());
        Ok(info)
    }

    /// Load (or replace) the target PDF
    /// Returns document info as JSON on success
    #[wasm_bindgen(js_name = addDocument)]
    pub fn add_document(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        let info = self
            .add_document_internal(name, bytes)
            .map_err(|e| JsValue::from_str(&e))?;

        serde_wasm_bindgen::to_value(&info)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Override the strip count (defaults to the document's page count)
    #[wasm_bindgen(js_name = setPageCount)]
    pub fn set_page_count(&mut self, count: u32) -> Result<(), JsValue> {
        self.inner
            .set_page_count(count)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The strip count currently in effect, or 0 when nothing decides it yet
    #[wasm_bindgen(js_name = effectivePageCount)]
    pub fn effective_page_count(&self) -> u32 {
        self.inner.effective_page_count().unwrap_or(0)
    }

    #[wasm_bindgen(js_name = hasStamp)]
    pub fn has_stamp(&self) -> bool {
        self.inner.has_stamp()
    }

    #[wasm_bindgen(js_name = hasDocument)]
    pub fn has_document(&self) -> bool {
        self.inner.has_document()
    }

    #[wasm_bindgen(js_name = documentName)]
    pub fn document_name(&self) -> Option<String> {
        self.document_name.clone()
    }

    #[wasm_bindgen(js_name = sliceCount)]
    pub fn slice_count(&self) -> usize {
        self.inner.slice_count()
    }

    /// PNG bytes of strip `index`, for rendering previews
    #[wasm_bindgen(js_name = getSlicePng)]
    pub fn get_slice_png(&self, index: usize) -> Result<js_sys::Uint8Array, JsValue> {
        let png = self
            .inner
            .slice_png(index)
            .ok_or_else(|| JsValue::from_str("Slice index out of bounds"))?;

        let array = js_sys::Uint8Array::new_with_length(png.len() as u32);
        array.copy_from(png);
        Ok(array)
    }

    /// Check if session is ready for execution
    #[wasm_bindgen(js_name = canExecute)]
    pub fn can_execute(&self) -> bool {
        self.inner.can_generate()
    }

    /// Internal method to generate the sealed PDF (testable without JsValue)
    fn execute_internal(&mut self) -> Result<Vec<u8>, String> {
        self.inner.generate().map_err(|e| e.to_string())
    }

    /// Generate the sealed PDF and return it as Uint8Array
    pub fn execute(&mut self) -> Result<js_sys::Uint8Array, JsValue> {
        if !self.can_execute() {
            return Err(JsValue::from_str("Session not ready for execution"));
        }

        self.report_progress(0, 100, "Slicing stamp...");
        self.report_progress(20, 100, "Stamping pages...");

        let result = self
            .execute_internal()
            .map_err(|e| JsValue::from_str(&format!("Sealing failed: {}", e)))?;

        self.report_progress(100, 100, "Complete");

        let array = js_sys::Uint8Array::new_with_length(result.len() as u32);
        array.copy_from(&result);
        Ok(array)
    }

    /// Report progress to JavaScript callback
    fn report_progress(&self, current: u32, total: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            let this = JsValue::null();
            let _ = callback.call3(
                &this,
                &JsValue::from(current),
                &JsValue::from(total),
                &JsValue::from_str(message),
            );
        }
    }
}
