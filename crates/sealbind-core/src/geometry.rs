//! Placement geometry for slice overlays.

use crate::error::SealBindError;

/// Target seal diameter on paper, in PDF points. 119pt is roughly 42mm, the
/// conventional physical size of a company seal, independent of page size.
pub const STAMP_DIAMETER_PT: f64 = 119.0;

/// The rectangle a slice is drawn into, in PDF user space (bottom-left
/// origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Compute where a slice lands on a page of the given size.
///
/// The slice height equals the full stamp height, i.e. the seal diameter in
/// source pixels, so scaling it to [`STAMP_DIAMETER_PT`] restores the seal's
/// physical size. The strip sits flush against the right page edge with its
/// bottom one third of the way up the page.
pub fn slice_placement(
    page_width: f64,
    page_height: f64,
    slice_width: u32,
    slice_height: u32,
) -> Result<Placement, SealBindError> {
    if page_width <= 0.0 || page_height <= 0.0 {
        return Err(SealBindError::Validation(format!(
            "page size must be positive, got {}x{}",
            page_width, page_height
        )));
    }
    if slice_width == 0 || slice_height == 0 {
        return Err(SealBindError::Validation(format!(
            "slice size must be positive, got {}x{}",
            slice_width, slice_height
        )));
    }

    let scale = STAMP_DIAMETER_PT / slice_height as f64;
    let width = slice_width as f64 * scale;
    let height = slice_height as f64 * scale;

    Ok(Placement {
        x: page_width - width,
        y: page_height / 3.0,
        width,
        height,
    })
}
