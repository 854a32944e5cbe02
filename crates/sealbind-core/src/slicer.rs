//! Stamp slicing.
//!
//! Cuts the seal image into equal-width vertical strips, one per page.

use crate::error::SealBindError;
use crate::stamp::{StampImage, StampSlice};
use image::imageops;
use std::io::Cursor;

/// Minimum number of pages a straddle seal makes sense for.
pub const MIN_PAGE_COUNT: u32 = 2;

/// Cut `stamp` into `page_count` strips of width `floor(width / page_count)`.
///
/// Every strip keeps the stamp's full height. When the width does not divide
/// evenly, the trailing `width % page_count` pixel columns are not captured
/// by any strip; all strips have identical width.
pub fn slice_stamp(
    stamp: &StampImage,
    page_count: u32,
) -> Result<Vec<StampSlice>, SealBindError> {
    if page_count < MIN_PAGE_COUNT {
        return Err(SealBindError::Validation(format!(
            "page count must be at least {}, got {}",
            MIN_PAGE_COUNT, page_count
        )));
    }

    let slice_width = stamp.width() / page_count;
    if slice_width == 0 {
        return Err(SealBindError::Validation(format!(
            "stamp is only {}px wide, too narrow to cut into {} strips",
            stamp.width(),
            page_count
        )));
    }

    let height = stamp.height();
    let mut slices = Vec::with_capacity(page_count as usize);

    for i in 0..page_count {
        let strip = imageops::crop_imm(stamp.pixels(), i * slice_width, 0, slice_width, height)
            .to_image();

        let mut png = Vec::new();
        strip
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| SealBindError::Encode(format!("failed to encode slice {}: {}", i, e)))?;

        slices.push(StampSlice {
            index: i,
            width: slice_width,
            height,
            png,
        });
    }

    Ok(slices)
}
