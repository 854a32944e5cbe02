//! Tauri command modules for the sealbind desktop app.
//!
//! This module provides native desktop functionality through Tauri commands,
//! allowing the web frontend to access OS-level features.

pub mod file_dialogs;

// Re-export all commands for convenient registration in lib.rs
pub use file_dialogs::{open_pdf_file, open_stamp_image, save_sealed_pdf};
