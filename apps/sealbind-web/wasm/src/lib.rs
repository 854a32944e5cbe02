//! WASM bindings for straddle-seal stamping
//!
//! This module provides a stateful, session-based API for sealing a PDF
//! with a sliced stamp. All state is held in Rust, minimizing JavaScript
//! complexity.
//!
//! ## Architecture
//!
//! - State management in Rust via `SealBindSession`
//! - Input validation and PDF parsing in Rust
//! - JavaScript only handles DOM events and file I/O
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { SealBindSession, defaultOutputName } from './pkg/sealbind_wasm.js';
//!
//! await init();
//!
//! const session = new SealBindSession();
//! session.setProgressCallback((current, total, msg) => updateUI(current, total, msg));
//! session.addStamp(stampBytes);
//! const info = session.addDocument("contract.pdf", pdfBytes);
//! const result = session.execute();
//! downloadBlob(result, defaultOutputName());
//! ```

pub mod session;
pub mod validation;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use session::SealBindSession;
pub use validation::PdfInfo;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quick validation check for a PDF file
/// Returns Ok(()) if valid, Err with message if not
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    validation::quick_validate(bytes).map_err(|e| JsValue::from_str(&e))
}

/// Get detailed PDF info without creating a session
/// Useful for showing file info before user commits to an operation
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = validation::validate_pdf(bytes).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Get page count from PDF bytes (convenience function)
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    let info = validation::validate_pdf(bytes).map_err(|e| JsValue::from_str(&e))?;
    Ok(info.page_count)
}

/// File name suggested for the sealed download
#[wasm_bindgen(js_name = defaultOutputName)]
pub fn default_output_name() -> String {
    sealbind_core::DEFAULT_OUTPUT_NAME.to_string()
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
