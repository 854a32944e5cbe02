//! Page composition.
//!
//! Overlays one stamp slice per page of a PDF. The overlay is purely
//! additive: existing page content, sizes and ordering are untouched, the
//! slice is drawn on top via an appended content stream.

use crate::error::SealBindError;
use crate::geometry::{slice_placement, Placement};
use crate::stamp::StampSlice;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// Compose `slices` onto the pages of `pdf_bytes`, slice `i` onto page `i`.
///
/// Fails with [`SealBindError::CountMismatch`] when the slice count and page
/// count disagree; in that case nothing is produced.
pub fn compose_document(
    pdf_bytes: &[u8],
    slices: &[StampSlice],
) -> Result<Vec<u8>, SealBindError> {
    let mut doc = Document::load_mem(pdf_bytes)
        .map_err(|e| SealBindError::Decode(format!("failed to parse PDF: {}", e)))?;

    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    if slices.len() != pages.len() {
        return Err(SealBindError::CountMismatch {
            slices: slices.len(),
            pages: pages.len(),
        });
    }

    for ((_, page_id), slice) in pages.iter().zip(slices) {
        overlay_slice(&mut doc, *page_id, slice)?;
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| SealBindError::Encode(format!("failed to save sealed PDF: {}", e)))?;

    Ok(buffer)
}

/// Embed one slice on one page: image XObject + resource entry + a balanced
/// `q cm Do Q` content stream.
fn overlay_slice(
    doc: &mut Document,
    page_id: ObjectId,
    slice: &StampSlice,
) -> Result<(), SealBindError> {
    let (page_width, page_height) = page_size(doc, page_id)?;
    let placement = slice_placement(page_width, page_height, slice.width, slice.height)?;

    let xobject_id = embed_slice_image(doc, slice)?;
    let name = format!("SealIm{}", slice.index);
    attach_xobject(doc, page_id, &name, xobject_id)?;
    append_draw_ops(doc, page_id, &name, placement)
}

/// Decode the slice PNG and add it to the document as an Image XObject.
/// RGB goes into a /DeviceRGB /FlateDecode stream; when the slice carries
/// transparency the alpha channel becomes a /DeviceGray /SMask stream.
fn embed_slice_image(doc: &mut Document, slice: &StampSlice) -> Result<ObjectId, SealBindError> {
    let decoded = image::load_from_memory_with_format(&slice.png, image::ImageFormat::Png)
        .map_err(|e| {
            SealBindError::Decode(format!("failed to decode slice {}: {}", slice.index, e))
        })?;
    let rgba = decoded.to_rgba8();

    let pixel_count = (rgba.width() * rgba.height()) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let has_transparency = alpha.iter().any(|&a| a != 0xFF);

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(rgba.width() as i64));
    image_dict.set("Height", Object::Integer(rgba.height() as i64));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

    if has_transparency {
        let mut smask_dict = Dictionary::new();
        smask_dict.set("Type", Object::Name(b"XObject".to_vec()));
        smask_dict.set("Subtype", Object::Name(b"Image".to_vec()));
        smask_dict.set("Width", Object::Integer(rgba.width() as i64));
        smask_dict.set("Height", Object::Integer(rgba.height() as i64));
        smask_dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
        smask_dict.set("BitsPerComponent", Object::Integer(8));
        smask_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

        let smask_id = doc.add_object(Stream::new(smask_dict, zlib_compress(&alpha)?));
        image_dict.set("SMask", Object::Reference(smask_id));
    }

    Ok(doc.add_object(Stream::new(image_dict, zlib_compress(&rgb)?)))
}

fn zlib_compress(data: &[u8]) -> Result<Vec<u8>, SealBindError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| SealBindError::Encode(format!("zlib compression failed: {}", e)))
}

/// Register `xobject_id` under `name` in the page's XObject resources.
///
/// Resources may be shared between pages (direct, referenced, or inherited
/// from the parent node), so the page gets its own direct copy before the
/// entry is added.
fn attach_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    xobject_id: ObjectId,
) -> Result<(), SealBindError> {
    let resources_obj = {
        let page_dict = dict_at(doc, page_id)?;
        match page_dict.get(b"Resources") {
            Ok(obj) => Some(obj.clone()),
            Err(_) => inherited_entry(doc, page_dict, b"Resources"),
        }
    };

    let mut resources = resolve_dict(doc, resources_obj);
    let xobjects_obj = resources.get(b"XObject").ok().cloned();
    let mut xobjects = resolve_dict(doc, xobjects_obj);

    xobjects.set(name, Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| SealBindError::Decode(format!("page object missing: {}", e)))?
        .as_dict_mut()
        .map_err(|_| SealBindError::Decode("page is not a dictionary".to_string()))?;
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Append a content stream drawing `name` into `placement`, after the page's
/// existing content.
fn append_draw_ops(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    placement: Placement,
) -> Result<(), SealBindError> {
    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(placement.width as f32),
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(placement.height as f32),
                Object::Real(placement.x as f32),
                Object::Real(placement.y as f32),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ];

    let content = Content { operations }
        .encode()
        .map_err(|e| SealBindError::Encode(format!("failed to encode overlay stream: {}", e)))?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| SealBindError::Decode(format!("page object missing: {}", e)))?
        .as_dict_mut()
        .map_err(|_| SealBindError::Decode("page is not a dictionary".to_string()))?;

    let existing = page.get(b"Contents").ok().cloned();
    let contents = match existing {
        Some(Object::Reference(id)) => {
            Object::Array(vec![Object::Reference(id), Object::Reference(stream_id)])
        }
        Some(Object::Array(mut streams)) => {
            streams.push(Object::Reference(stream_id));
            Object::Array(streams)
        }
        _ => Object::Reference(stream_id),
    };
    page.set("Contents", contents);

    Ok(())
}

/// Page size in points from the MediaBox, inheriting from the parent node
/// when absent, defaulting to US Letter.
fn page_size(doc: &Document, page_id: ObjectId) -> Result<(f64, f64), SealBindError> {
    let page_dict = dict_at(doc, page_id)?;

    let media_box = match page_dict.get(b"MediaBox") {
        Ok(obj) => Some(obj.clone()),
        Err(_) => inherited_entry(doc, page_dict, b"MediaBox"),
    };

    let rect = match media_box {
        Some(Object::Array(array)) => parse_box_array(&array)?,
        Some(Object::Reference(id)) => match doc.get_object(id) {
            Ok(Object::Array(array)) => parse_box_array(array)?,
            _ => [0.0, 0.0, 612.0, 792.0],
        },
        _ => [0.0, 0.0, 612.0, 792.0],
    };

    Ok((rect[2] - rect[0], rect[3] - rect[1]))
}

fn parse_box_array(array: &[Object]) -> Result<[f64; 4], SealBindError> {
    if array.len() != 4 {
        return Err(SealBindError::Decode(
            "MediaBox must have 4 elements".to_string(),
        ));
    }
    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => {
                return Err(SealBindError::Decode(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }
    Ok(result)
}

fn dict_at<'a>(doc: &'a Document, id: ObjectId) -> Result<&'a Dictionary, SealBindError> {
    doc.get_object(id)
        .map_err(|e| SealBindError::Decode(format!("object missing: {}", e)))?
        .as_dict()
        .map_err(|_| SealBindError::Decode("expected a dictionary object".to_string()))
}

/// Look one level up the page tree for an inheritable entry.
fn inherited_entry(doc: &Document, page_dict: &Dictionary, key: &[u8]) -> Option<Object> {
    let parent_id = page_dict.get(b"Parent").ok()?.as_reference().ok()?;
    let parent = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    parent.get(key).ok().cloned()
}

/// Materialize a resources-like object (direct dict or reference) into an
/// owned dictionary.
fn resolve_dict(doc: &Document, obj: Option<Object>) -> Dictionary {
    match obj {
        Some(Object::Dictionary(dict)) => dict,
        Some(Object::Reference(id)) => doc
            .get_object(id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .unwrap_or_default(),
        _ => Dictionary::new(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::create_test_pdf;
    use super::*;
    use crate::slicer::slice_stamp;
    use crate::stamp::test_fixtures::{stamp_png, stamp_png_with_alpha};
    use crate::stamp::StampImage;
    use lopdf::{Document, Object};
    use pretty_assertions::assert_eq;

    fn slices_for(pages: u32) -> Vec<crate::stamp::StampSlice> {
        let stamp = StampImage::from_png_bytes(&stamp_png(420, 100)).unwrap();
        slice_stamp(&stamp, pages).unwrap()
    }

    #[test]
    fn test_compose_preserves_page_count() {
        let pdf = create_test_pdf(3, 595, 842);
        let output = compose_document(&pdf, &slices_for(3)).unwrap();

        assert!(output.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_compose_rejects_count_mismatch() {
        let pdf = create_test_pdf(2, 595, 842);
        let err = compose_document(&pdf, &slices_for(3)).unwrap_err();
        assert_eq!(err.kind(), "count_mismatch");
    }

    #[test]
    fn test_compose_rejects_garbage_bytes() {
        let err = compose_document(b"definitely not a pdf", &slices_for(2)).unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_every_page_gets_its_slice_resource() {
        let pdf = create_test_pdf(3, 595, 842);
        let output = compose_document(&pdf, &slices_for(3)).unwrap();

        let doc = Document::load_mem(&output).unwrap();
        for (page_num, page_id) in doc.get_pages() {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let name = format!("SealIm{}", page_num - 1);
            assert!(
                xobjects.get(name.as_bytes()).is_ok(),
                "page {} missing {}",
                page_num,
                name
            );
        }
    }

    #[test]
    fn test_original_content_kept_and_overlay_appended() {
        let pdf = create_test_pdf(2, 595, 842);
        let output = compose_document(&pdf, &slices_for(2)).unwrap();

        let doc = Document::load_mem(&output).unwrap();
        for (_, page_id) in doc.get_pages() {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let contents = page.get(b"Contents").unwrap().as_array().unwrap();
            assert_eq!(contents.len(), 2, "original stream + overlay stream");
        }
    }

    #[test]
    fn test_transparent_stamp_gets_smask() {
        let pdf = create_test_pdf(2, 595, 842);
        let stamp = StampImage::from_png_bytes(&stamp_png_with_alpha(100, 40)).unwrap();
        let slices = slice_stamp(&stamp, 2).unwrap();

        let output = compose_document(&pdf, &slices).unwrap();
        let doc = Document::load_mem(&output).unwrap();

        let smask_count = doc
            .objects
            .values()
            .filter(|obj| match obj {
                Object::Stream(stream) => stream.dict.get(b"SMask").is_ok(),
                _ => false,
            })
            .count();
        assert_eq!(smask_count, 2, "one masked image per page");
    }

    #[test]
    fn test_opaque_stamp_has_no_smask() {
        let pdf = create_test_pdf(2, 595, 842);
        let output = compose_document(&pdf, &slices_for(2)).unwrap();
        let doc = Document::load_mem(&output).unwrap();

        let smask_count = doc
            .objects
            .values()
            .filter(|obj| match obj {
                Object::Stream(stream) => stream.dict.get(b"SMask").is_ok(),
                _ => false,
            })
            .count();
        assert_eq!(smask_count, 0);
    }

    #[test]
    fn test_pages_of_different_sizes_each_get_own_placement() {
        // Each page's placement comes from its own MediaBox; a composed
        // mixed-size document must still round-trip cleanly.
        let mut doc = Document::load_mem(&create_test_pdf(2, 595, 842)).unwrap();
        let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
        let second = doc
            .get_object_mut(page_ids[1])
            .unwrap()
            .as_dict_mut()
            .unwrap();
        second.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let output = compose_document(&bytes, &slices_for(2)).unwrap();
        assert_eq!(Document::load_mem(&output).unwrap().get_pages().len(), 2);
    }

    #[test]
    fn test_page_size_reads_media_box() {
        let pdf = create_test_pdf(1, 595, 842);
        let doc = Document::load_mem(&pdf).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let (w, h) = page_size(&doc, page_id).unwrap();
        assert_eq!(w, 595.0);
        assert_eq!(h, 842.0);
    }

    #[test]
    fn test_page_size_defaults_to_letter_when_absent() {
        let pdf = create_test_pdf(1, 595, 842);
        let mut doc = Document::load_mem(&pdf).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .remove(b"MediaBox");
        // Parent Pages node has no MediaBox either in the fixture.
        let (w, h) = page_size(&doc, page_id).unwrap();
        assert_eq!(w, 612.0);
        assert_eq!(h, 792.0);
    }
}
