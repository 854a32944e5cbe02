//! Tauri sealbind desktop application.
//!
//! This crate provides the native backend for the sealbind desktop app:
//! file dialogs for picking the stamp image and the target PDF, and a save
//! dialog for persisting the sealed result.

pub mod commands;

use commands::{open_pdf_file, open_stamp_image, save_sealed_pdf};

/// Register all Tauri commands and run the application.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt::init();
    tracing::info!("starting sealbind desktop backend");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .invoke_handler(tauri::generate_handler![
            // File dialog commands
            open_stamp_image,
            open_pdf_file,
            save_sealed_pdf,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
