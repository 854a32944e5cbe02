//! Input validation and info extraction
//!
//! Validates uploaded files and extracts metadata before they enter a
//! session, so the UI can surface problems immediately.

use lopdf::Document;
use serde::Serialize;

/// PDF file information extracted during validation
#[derive(Debug, Clone, Serialize, Default)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Whether the document appears valid
    pub valid: bool,
}

/// Validate a PDF file and extract basic info
pub fn validate_pdf(bytes: &[u8]) -> Result<PdfInfo, String> {
    if bytes.len() < 8 {
        return Err("File too small to be a valid PDF".to_string());
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err("Not a valid PDF file (missing %PDF- header)".to_string());
    }

    let version = extract_version(bytes);

    let document = Document::load_mem(bytes).map_err(|e| format!("Failed to parse PDF: {}", e))?;

    let encrypted = document.is_encrypted();

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err("PDF has no pages".to_string());
    }
    if page_count < 2 {
        return Err("A straddle seal needs a document with at least 2 pages".to_string());
    }

    Ok(PdfInfo {
        page_count,
        version,
        encrypted,
        size_bytes: bytes.len(),
        valid: true,
    })
}

/// Extract PDF version from header
fn extract_version(bytes: &[u8]) -> String {
    // Header format: %PDF-1.7
    if bytes.len() >= 8 && bytes.starts_with(b"%PDF-") {
        let version_bytes = &bytes[5..8];
        if let Ok(version) = std::str::from_utf8(version_bytes) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string() // Default version
}

/// Quick validation without full parsing (for large files)
pub fn quick_validate(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("File too small to be a valid PDF".to_string());
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err("Not a valid PDF file (missing %PDF- header)".to_string());
    }

    // Check for EOF marker (should be near the end)
    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };

    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err("PDF appears truncated (missing %%EOF marker)".to_string());
    }

    Ok(())
}

/// Check that stamp bytes look like a PNG before handing them to the decoder.
pub fn validate_stamp(bytes: &[u8]) -> Result<(), String> {
    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    if bytes.len() < PNG_MAGIC.len() {
        return Err("File too small to be a PNG image".to_string());
    }
    if !bytes.starts_with(&PNG_MAGIC) {
        return Err("Stamp must be a PNG image".to_string());
    }
    Ok(())
}
