//! Image-backed document assembly
//!
//! Builds a PDF with one page per uploaded image using `printpdf` 0.8's
//! data-oriented API: each page is a `Vec<Op>` drawing a single image
//! XObject, and the whole document is serialized with `PdfDocument::save`.

use crate::error::Result;
use image::ImageFormat;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};

/// An uploaded image: the client-declared mime type plus the raw bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Map a declared mime type to a decodable format. `None` means the upload
/// is skipped, mirroring the lenient policy of the page-spec parser.
fn supported_format(mime_type: &str) -> Option<ImageFormat> {
    match mime_type {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        _ => None,
    }
}

/// Build a PDF with one page per supported image, in input order.
///
/// Pages are sized exactly to the image's pixel dimensions (1 px = 1 pt,
/// no scaling) and the image is drawn from the page origin. Unsupported
/// mime types are skipped; a set with no supported image at all still
/// serializes, as a valid zero-page document.
///
/// A supported image that fails to decode is an error: the client declared
/// a type we handle, so bad bytes are not silently droppable.
pub fn images_to_pdf(images: &[ImageUpload]) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new("Images");
    let mut pages: Vec<PdfPage> = Vec::new();

    for upload in images {
        let format = match supported_format(&upload.mime_type) {
            Some(f) => f,
            None => {
                tracing::debug!(mime = %upload.mime_type, "skipping unsupported image type");
                continue;
            }
        };

        let decoded = image::load_from_memory_with_format(&upload.data, format)?;
        let (width_px, height_px) = (decoded.width() as usize, decoded.height() as usize);

        let rgb = decoded.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: width_px,
            height: height_px,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        // Page dimensions equal the image's pixel dimensions in points;
        // at 72 dpi the XObject renders at exactly that size.
        let page_w = Mm(width_px as f32 / PT_PER_MM);
        let page_h = Mm(height_px as f32 / PT_PER_MM);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(72.0),
                rotate: None,
            },
        }];

        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
}
