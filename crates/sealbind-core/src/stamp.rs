//! Stamp image loading and slice artifacts.

use crate::error::SealBindError;
use image::RgbaImage;

/// PNG magic bytes: 89 50 4E 47 0D 0A 1A 0A
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A decoded seal image. The height is treated as the seal's diameter when
/// computing the physical placement scale.
#[derive(Debug, Clone)]
pub struct StampImage {
    rgba: RgbaImage,
}

impl StampImage {
    /// Decode a stamp from PNG bytes.
    ///
    /// Only PNG input is accepted; anything else is rejected up front
    /// rather than handed to the decoder.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, SealBindError> {
        if bytes.len() < PNG_MAGIC.len() || !bytes.starts_with(&PNG_MAGIC) {
            return Err(SealBindError::InvalidInputFormat(
                "stamp must be a PNG image".to_string(),
            ));
        }

        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| SealBindError::Decode(format!("invalid PNG data: {}", e)))?;

        let rgba = decoded.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(SealBindError::Decode("PNG has zero dimensions".to_string()));
        }

        Ok(Self { rgba })
    }

    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub(crate) fn pixels(&self) -> &RgbaImage {
        &self.rgba
    }
}

/// One vertical strip of the seal, re-encoded as an independent PNG.
///
/// Slice `index` is composited onto page `index` (0-indexed), so the
/// leftmost strip lands on the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampSlice {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}
