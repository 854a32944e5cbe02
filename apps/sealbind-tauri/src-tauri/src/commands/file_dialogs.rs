//! Native file dialog commands for straddle-seal stamping.
//!
//! These commands provide native OS file dialogs for opening the stamp
//! image, opening the target PDF, and saving the sealed result. User
//! cancellation is a normal outcome (`Ok(None)`), never an error.

use std::path::PathBuf;
use tauri_plugin_dialog::DialogExt;

/// Maximum file size allowed (100MB)
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

/// PNG magic bytes
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Validates file size against the maximum limit.
pub fn validate_file_size(size: usize) -> Result<(), String> {
    if size > MAX_FILE_SIZE {
        Err("This file is too large (over 100MB). Please select a smaller file.".to_string())
    } else {
        Ok(())
    }
}

/// Validates that PDF bytes are not empty.
pub fn validate_pdf_not_empty(bytes: &[u8]) -> Result<(), String> {
    if bytes.is_empty() {
        Err("Cannot save an empty PDF file.".to_string())
    } else {
        Ok(())
    }
}

/// Validates that the chosen stamp file starts with the PNG signature.
pub fn validate_stamp_bytes(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < PNG_MAGIC.len() || !bytes.starts_with(&PNG_MAGIC) {
        Err("The selected stamp is not a PNG image. Please choose a PNG file.".to_string())
    } else {
        Ok(())
    }
}

/// Sanitizes a suggested filename for saving.
///
/// - Removes path separators to prevent directory traversal
/// - Replaces dangerous characters (including control characters)
/// - Ensures non-empty result
/// - Limits length to reasonable value (respecting UTF-8 boundaries)
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => Some('_'),
            '\0'..='\x1f' | '\x7f' => None, // Remove control characters entirely (including DEL)
            c => Some(c),
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.');

    // Limit length (255 is common filesystem limit)
    // Use char_indices to respect UTF-8 boundaries
    let limited = if trimmed.chars().count() > 200 {
        let end_idx = trimmed
            .char_indices()
            .nth(200)
            .map(|(idx, _)| idx)
            .unwrap_or(trimmed.len());
        &trimmed[..end_idx]
    } else {
        trimmed
    };

    if limited.is_empty() {
        sealbind_core::DEFAULT_OUTPUT_NAME.to_string()
    } else {
        limited.to_string()
    }
}

/// Ensures a path has the .pdf extension.
pub fn ensure_pdf_extension(path: &PathBuf) -> PathBuf {
    let mut result = path.clone();
    if result.extension().map_or(true, |ext| {
        ext.to_str().map_or(true, |s| s.to_lowercase() != "pdf")
    }) {
        result.set_extension("pdf");
    }
    result
}

/// Formats an error message for reading a file.
pub fn format_read_error(error: impl std::fmt::Display) -> String {
    format!(
        "Could not read the selected file. Please make sure you have permission to access it. ({})",
        error
    )
}

/// Formats an error message for writing a file.
pub fn format_write_error(error: impl std::fmt::Display) -> String {
    format!(
        "Could not save the file. Please make sure you have permission to write to this location. ({})",
        error
    )
}

/// Formats an error message for file selection access.
pub fn format_selection_error(error: impl std::fmt::Display) -> String {
    format!(
        "Could not access the selected file. Please try again. ({})",
        error
    )
}

/// Opens a native file picker for selecting the stamp PNG.
///
/// Returns the file contents as bytes if a file was selected,
/// or None if the user cancelled the dialog.
#[tauri::command]
pub async fn open_stamp_image(app: tauri::AppHandle) -> Result<Option<Vec<u8>>, String> {
    // Stamps usually live with the user's pictures
    let default_path = dirs::picture_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let file_path = app
        .dialog()
        .file()
        .set_title("Open Seal Image")
        .add_filter("PNG Images", &["png", "PNG"])
        .set_directory(default_path)
        .blocking_pick_file();

    match file_path {
        Some(path) => {
            let path_buf = path.into_path().map_err(format_selection_error)?;

            let bytes = tokio::fs::read(&path_buf)
                .await
                .map_err(format_read_error)?;

            validate_file_size(bytes.len())?;
            validate_stamp_bytes(&bytes)?;

            tracing::debug!(size = bytes.len(), "stamp image loaded");
            Ok(Some(bytes))
        }
        None => {
            // User cancelled - this is normal, not an error
            Ok(None)
        }
    }
}

/// Opens a native file picker for selecting the PDF to seal.
///
/// Returns the file contents as bytes if a file was selected,
/// or None if the user cancelled the dialog.
#[tauri::command]
pub async fn open_pdf_file(app: tauri::AppHandle) -> Result<Option<Vec<u8>>, String> {
    let default_path = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));

    let file_path = app
        .dialog()
        .file()
        .set_title("Open PDF Document")
        .add_filter("PDF Documents", &["pdf", "PDF"])
        .set_directory(default_path)
        .blocking_pick_file();

    match file_path {
        Some(path) => {
            let path_buf = path.into_path().map_err(format_selection_error)?;

            let bytes = tokio::fs::read(&path_buf)
                .await
                .map_err(format_read_error)?;

            validate_file_size(bytes.len())?;

            tracing::debug!(size = bytes.len(), "pdf document loaded");
            Ok(Some(bytes))
        }
        None => Ok(None),
    }
}

/// Opens a native save dialog for persisting the sealed PDF.
///
/// # Arguments
/// * `pdf_bytes` - The sealed PDF contents
/// * `suggested_name` - A suggested filename (e.g., "straddle-sealed.pdf")
///
/// # Returns
/// * `Ok(Some(path))` - The path where the file was saved
/// * `Ok(None)` - The user cancelled the save dialog
/// * `Err(message)` - An error occurred while saving
#[tauri::command]
pub async fn save_sealed_pdf(
    app: tauri::AppHandle,
    pdf_bytes: Vec<u8>,
    suggested_name: String,
) -> Result<Option<String>, String> {
    validate_pdf_not_empty(&pdf_bytes)?;

    let default_path = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));
    let file_name = sanitize_filename(&suggested_name);

    let save_path = app
        .dialog()
        .file()
        .set_title("Save Sealed PDF Document")
        .add_filter("PDF Documents", &["pdf", "PDF"])
        .set_directory(default_path)
        .set_file_name(&file_name)
        .blocking_save_file();

    match save_path {
        Some(path) => {
            let path_buf = path.into_path().map_err(|e| {
                format!(
                    "Could not access the save location. Please try again. ({})",
                    e
                )
            })?;
            let path_buf = ensure_pdf_extension(&path_buf);

            tokio::fs::write(&path_buf, &pdf_bytes)
                .await
                .map_err(format_write_error)?;

            tracing::info!(path = %path_buf.display(), "sealed pdf saved");
            Ok(Some(path_buf.to_string_lossy().to_string()))
        }
        None => {
            // User cancelled - this is normal, not an error
            Ok(None)
        }
    }
}
