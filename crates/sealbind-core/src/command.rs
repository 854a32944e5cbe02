//! One-shot command surface.
//!
//! Stateless counterpart to [`crate::session::SealSession`]: a host hands in
//! a serde-tagged command with all inputs attached and gets a serializable
//! result back. Interactive flows (previews, incremental uploads) go through
//! the session instead.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::compose::compose_document;
use crate::error::SealBindError;
use crate::slicer::slice_stamp;
use crate::stamp::StampImage;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SealCommand {
    /// Validate a stamp and cut it, without touching a document.
    SliceStamp { stamp: Vec<u8>, page_count: u32 },
    /// Full pipeline: slice the stamp and seal the document.
    /// `page_count` overrides the document's own page count when set.
    Generate {
        stamp: Vec<u8>,
        document: Vec<u8>,
        page_count: Option<u32>,
    },
    /// Report a document's page count.
    PageCount { document: Vec<u8> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    /// Base64-encoded PDF data
    pub data: Option<String>,
    pub error: Option<String>,
    pub metrics: Option<ProcessMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
}

impl ProcessResult {
    fn failure(err: SealBindError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            metrics: None,
        }
    }
}

/// Execute a command, never panicking: every failure becomes a
/// `success: false` result with a human-readable error.
pub fn process(command: SealCommand) -> ProcessResult {
    match run(command) {
        Ok(result) => result,
        Err(err) => ProcessResult::failure(err),
    }
}

fn run(command: SealCommand) -> Result<ProcessResult, SealBindError> {
    match command {
        SealCommand::SliceStamp { stamp, page_count } => {
            let image = StampImage::from_png_bytes(&stamp)?;
            let slices = slice_stamp(&image, page_count)?;
            let output_size = slices.iter().map(|s| s.png.len()).sum();

            Ok(ProcessResult {
                success: true,
                data: None,
                error: None,
                metrics: Some(ProcessMetrics {
                    input_size_bytes: stamp.len(),
                    output_size_bytes: output_size,
                    page_count,
                }),
            })
        }
        SealCommand::Generate {
            stamp,
            document,
            page_count,
        } => {
            let image = StampImage::from_png_bytes(&stamp)?;
            let count = match page_count {
                Some(count) => count,
                None => crate::get_page_count(&document)?,
            };
            let slices = slice_stamp(&image, count)?;
            let sealed = compose_document(&document, &slices)?;

            Ok(ProcessResult {
                success: true,
                data: Some(BASE64.encode(&sealed)),
                error: None,
                metrics: Some(ProcessMetrics {
                    input_size_bytes: stamp.len() + document.len(),
                    output_size_bytes: sealed.len(),
                    page_count: count,
                }),
            })
        }
        SealCommand::PageCount { document } => {
            let count = crate::get_page_count(&document)?;
            Ok(ProcessResult {
                success: true,
                data: None,
                error: None,
                metrics: Some(ProcessMetrics {
                    input_size_bytes: document.len(),
                    output_size_bytes: 0,
                    page_count: count,
                }),
            })
        }
    }
}
