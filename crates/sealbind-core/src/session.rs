//! Stateful sealing session.
//!
//! Hosts (browser, desktop) load inputs one at a time and in any order; the
//! session holds whatever has arrived so far and keeps the slice set current.

use crate::compose::compose_document;
use crate::error::SealBindError;
use crate::slicer::{slice_stamp, MIN_PAGE_COUNT};
use crate::stamp::{StampImage, StampSlice};

struct LoadedDocument {
    bytes: Vec<u8>,
    page_count: u32,
}

/// Accumulates a stamp, a document and an optional page-count override, and
/// produces the sealed PDF once everything needed is present.
///
/// Uploading a new stamp or document replaces the previous one; slices are
/// recut on every change so previews never go stale.
pub struct SealSession {
    stamp: Option<StampImage>,
    document: Option<LoadedDocument>,
    page_count_override: Option<u32>,
    slices: Vec<StampSlice>,
    in_flight: bool,
}

impl Default for SealSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SealSession {
    pub fn new() -> Self {
        Self {
            stamp: None,
            document: None,
            page_count_override: None,
            slices: Vec::new(),
            in_flight: false,
        }
    }

    /// Load (or replace) the seal image from PNG bytes.
    ///
    /// Decodes and recuts before committing, so a stamp that cannot be
    /// sliced for the current page count leaves the session unchanged.
    pub fn load_stamp(&mut self, png_bytes: &[u8]) -> Result<(), SealBindError> {
        let stamp = StampImage::from_png_bytes(png_bytes)?;
        let slices = match self.effective_page_count() {
            Some(count) => slice_stamp(&stamp, count)?,
            None => Vec::new(),
        };
        self.stamp = Some(stamp);
        self.slices = slices;
        Ok(())
    }

    /// Load (or replace) the target PDF. Returns its page count.
    ///
    /// A document that fails validation or makes the loaded stamp
    /// unsliceable is not kept; the previous document stays in place.
    pub fn load_document(&mut self, pdf_bytes: &[u8]) -> Result<u32, SealBindError> {
        let page_count = crate::get_page_count(pdf_bytes)?;
        if page_count < MIN_PAGE_COUNT {
            return Err(SealBindError::Validation(format!(
                "document has {} page(s); a straddle seal needs at least {}",
                page_count, MIN_PAGE_COUNT
            )));
        }
        let effective = self.page_count_override.unwrap_or(page_count);
        let slices = match &self.stamp {
            Some(stamp) => slice_stamp(stamp, effective)?,
            None => Vec::new(),
        };
        self.document = Some(LoadedDocument {
            bytes: pdf_bytes.to_vec(),
            page_count,
        });
        self.slices = slices;
        Ok(page_count)
    }

    /// Override how many strips the stamp is cut into. Without an override
    /// the document's page count is used. A count the loaded stamp cannot
    /// be cut into is rejected without changing the session.
    pub fn set_page_count(&mut self, count: u32) -> Result<(), SealBindError> {
        if count < MIN_PAGE_COUNT {
            return Err(SealBindError::Validation(format!(
                "page count must be at least {}, got {}",
                MIN_PAGE_COUNT, count
            )));
        }
        let slices = match &self.stamp {
            Some(stamp) => slice_stamp(stamp, count)?,
            None => Vec::new(),
        };
        self.page_count_override = Some(count);
        self.slices = slices;
        Ok(())
    }

    /// The strip count that will be used: the override if set, otherwise the
    /// loaded document's page count.
    pub fn effective_page_count(&self) -> Option<u32> {
        self.page_count_override
            .or_else(|| self.document.as_ref().map(|d| d.page_count))
    }

    pub fn has_stamp(&self) -> bool {
        self.stamp.is_some()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn document_page_count(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.page_count)
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// PNG bytes of strip `index`, for previews.
    pub fn slice_png(&self, index: usize) -> Option<&[u8]> {
        self.slices.get(index).map(|s| s.png.as_slice())
    }

    /// True once a generate call can succeed (inputs present and sliced).
    pub fn can_generate(&self) -> bool {
        self.stamp.is_some() && self.document.is_some() && !self.slices.is_empty()
    }

    /// Produce the sealed PDF.
    ///
    /// The in-flight flag mirrors the host rule that the generate control
    /// is disabled while a run is underway. Calls here are synchronous, so
    /// the branch only triggers if a host wires a re-entrant callback into
    /// the pipeline; it is not a concurrency primitive.
    pub fn generate(&mut self) -> Result<Vec<u8>, SealBindError> {
        if self.in_flight {
            return Err(SealBindError::Validation(
                "a generation is already in progress".to_string(),
            ));
        }
        self.in_flight = true;
        let result = self.generate_inner();
        self.in_flight = false;
        result
    }

    fn generate_inner(&self) -> Result<Vec<u8>, SealBindError> {
        if self.stamp.is_none() {
            return Err(SealBindError::Validation(
                "no stamp loaded".to_string(),
            ));
        }
        let document = self.document.as_ref().ok_or_else(|| {
            SealBindError::Validation("no document loaded".to_string())
        })?;
        compose_document(&document.bytes, &self.slices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stamp::test_fixtures::stamp_png;
    use lopdf::Document;
    use pretty_assertions::assert_eq;

    fn test_pdf(pages: u32) -> Vec<u8> {
        crate::compose::test_fixtures::create_test_pdf(pages, 595, 842)
    }

    #[test]
    fn test_fresh_session_cannot_generate() {
        let session = SealSession::new();
        assert!(!session.can_generate());
        assert!(!session.has_stamp());
        assert!(!session.has_document());
        assert_eq!(session.effective_page_count(), None);
    }

    #[test]
    fn test_generate_without_stamp_names_the_stamp() {
        let mut session = SealSession::new();
        session.load_document(&test_pdf(2)).unwrap();
        let err = session.generate().unwrap_err();
        assert!(err.to_string().contains("stamp"));
    }

    #[test]
    fn test_generate_without_document_names_the_document() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(100, 40)).unwrap();
        let err = session.generate().unwrap_err();
        assert!(err.to_string().contains("document"));
    }

    #[test]
    fn test_inputs_in_either_order() {
        let pdf = test_pdf(3);
        let stamp = stamp_png(300, 100);

        let mut a = SealSession::new();
        a.load_stamp(&stamp).unwrap();
        a.load_document(&pdf).unwrap();

        let mut b = SealSession::new();
        b.load_document(&pdf).unwrap();
        b.load_stamp(&stamp).unwrap();

        assert!(a.can_generate());
        assert!(b.can_generate());
        assert_eq!(a.slice_count(), 3);
        assert_eq!(b.slice_count(), 3);
    }

    #[test]
    fn test_page_count_defaults_to_document() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(4)).unwrap();
        assert_eq!(session.effective_page_count(), Some(4));
        assert_eq!(session.slice_count(), 4);
    }

    #[test]
    fn test_override_wins_over_document_count() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(4)).unwrap();
        session.set_page_count(6).unwrap();
        assert_eq!(session.effective_page_count(), Some(6));
        assert_eq!(session.slice_count(), 6);
    }

    #[test]
    fn test_replacing_stamp_recuts_slices() {
        let mut session = SealSession::new();
        session.load_document(&test_pdf(2)).unwrap();
        session.load_stamp(&stamp_png(100, 40)).unwrap();
        let before = session.slice_png(0).unwrap().to_vec();

        session.load_stamp(&stamp_png(200, 80)).unwrap();
        let after = session.slice_png(0).unwrap().to_vec();
        assert_ne!(before, after);
        assert_eq!(session.slice_count(), 2);
    }

    #[test]
    fn test_replacing_document_adjusts_slice_count() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(2)).unwrap();
        assert_eq!(session.slice_count(), 2);

        session.load_document(&test_pdf(5)).unwrap();
        assert_eq!(session.slice_count(), 5);
    }

    #[test]
    fn test_rejects_single_page_document() {
        let mut session = SealSession::new();
        let err = session.load_document(&test_pdf(1)).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(!session.has_document());
    }

    #[test]
    fn test_rejects_page_count_below_minimum() {
        let mut session = SealSession::new();
        assert!(session.set_page_count(1).is_err());
        assert!(session.set_page_count(0).is_err());
        assert!(session.set_page_count(2).is_ok());
    }

    #[test]
    fn test_generate_produces_valid_pdf() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(3)).unwrap();

        let output = session.generate().unwrap();
        let doc = Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_generate_can_run_again_after_success() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(2)).unwrap();

        let first = session.generate().unwrap();
        let second = session.generate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_can_run_again_after_failure() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        assert!(session.generate().is_err());

        session.load_document(&test_pdf(2)).unwrap();
        assert!(session.generate().is_ok());
    }

    #[test]
    fn test_failed_document_load_keeps_previous_document() {
        let mut session = SealSession::new();
        // 10px-wide stamp slices into 2 strips but never into 20.
        session.load_stamp(&stamp_png(10, 10)).unwrap();
        session.load_document(&test_pdf(2)).unwrap();
        assert_eq!(session.slice_count(), 2);

        let err = session.load_document(&test_pdf(20)).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(session.document_page_count(), Some(2));
        assert_eq!(session.slice_count(), 2);
        assert!(session.can_generate());
        assert!(session.generate().is_ok());
    }

    #[test]
    fn test_failed_override_keeps_previous_count() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(10, 10)).unwrap();
        session.load_document(&test_pdf(2)).unwrap();

        let err = session.set_page_count(11).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(session.effective_page_count(), Some(2));
        assert_eq!(session.slice_count(), 2);
    }

    #[test]
    fn test_failed_stamp_load_keeps_previous_stamp() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(5)).unwrap();
        let before = session.slice_png(0).unwrap().to_vec();

        // 4px wide cannot be cut into 5 strips.
        let err = session.load_stamp(&stamp_png(4, 10)).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(session.has_stamp());
        assert_eq!(session.slice_count(), 5);
        assert_eq!(session.slice_png(0).unwrap(), before.as_slice());
    }

    #[test]
    fn test_generate_rejects_overlapping_calls() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(2)).unwrap();

        session.in_flight = true;
        let err = session.generate().unwrap_err();
        assert!(err.to_string().contains("already in progress"));

        session.in_flight = false;
        assert!(session.generate().is_ok());
    }

    #[test]
    fn test_override_mismatching_document_fails_generate() {
        let mut session = SealSession::new();
        session.load_stamp(&stamp_png(300, 100)).unwrap();
        session.load_document(&test_pdf(3)).unwrap();
        session.set_page_count(5).unwrap();

        let err = session.generate().unwrap_err();
        assert_eq!(err.kind(), "count_mismatch");
    }
}
