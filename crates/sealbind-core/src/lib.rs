//! Straddle-seal PDF stamping
//!
//! Cuts a round seal image into vertical strips and lays one strip on the
//! right edge of each page, so the full seal reappears when the printed
//! pages are fanned out. All processing is in-memory via lopdf; no
//! platform branching, so the same code runs in WASM and native hosts.

pub mod command;
pub mod compose;
pub mod error;
pub mod geometry;
pub mod session;
pub mod slicer;
pub mod stamp;

pub use command::{process, ProcessMetrics, ProcessResult, SealCommand};
pub use compose::compose_document;
pub use error::SealBindError;
pub use geometry::{slice_placement, Placement, STAMP_DIAMETER_PT};
pub use session::SealSession;
pub use slicer::{slice_stamp, MIN_PAGE_COUNT};
pub use stamp::{StampImage, StampSlice};

/// File name hosts suggest when saving the sealed document.
pub const DEFAULT_OUTPUT_NAME: &str = "straddle-sealed.pdf";

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, SealBindError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| SealBindError::Decode(format!("failed to parse PDF: {}", e)))?;
    Ok(doc.get_pages().len() as u32)
}
