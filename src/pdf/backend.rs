//! Fixed-layout page access behind a backend trait.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::{detect_format_from_path, DocFormat};
use crate::error::{Error, Result};
use crate::model::{ImageBlock, TextSpan, VisualPage};

use super::layout;

/// Page-level access to a fixed-layout document.
///
/// The lopdf implementation is the production backend; tests substitute
/// synthetic backends to drive measurement code without real files.
pub trait PdfBackend: Send + Sync {
    /// Total number of pages.
    fn page_count(&self) -> u32;

    /// Page width and height in points.
    fn page_size(&self, number: u32) -> Result<(f32, f32)>;

    /// All text spans of a page, in content-stream order.
    fn page_spans(&self, number: u32) -> Result<Vec<TextSpan>>;

    /// All image blocks of a page.
    fn page_images(&self, number: u32) -> Result<Vec<ImageBlock>> {
        let _ = number;
        Ok(Vec::new())
    }

    /// Assemble one page of the visual model.
    fn read_page(&self, number: u32) -> Result<VisualPage> {
        let (width, height) = self.page_size(number)?;
        Ok(VisualPage {
            number,
            width,
            height,
            spans: self.page_spans(number)?,
            images: self.page_images(number)?,
        })
    }
}

/// PDF backend built on lopdf.
#[derive(Debug)]
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Open a PDF file, verifying the format by magic bytes first.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match detect_format_from_path(path)? {
            DocFormat::Pdf => {}
            _ => return Err(Error::UnknownFormat),
        }
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        Self { doc }
    }

    fn page_id(&self, number: u32) -> Result<lopdf::ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&number)
            .copied()
            .ok_or_else(|| Error::Parse(format!("page {} out of range", number)))
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn page_size(&self, number: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(number)?;

        if let Ok(page_dict) = self.doc.get_dictionary(page_id) {
            if let Ok(media_box) = page_dict.get(b"MediaBox") {
                if let Ok(array) = media_box.as_array() {
                    if array.len() >= 4 {
                        let width = array[2].as_float().unwrap_or(612.0);
                        let height = array[3].as_float().unwrap_or(792.0);
                        return Ok((width, height));
                    }
                }
            }
        }

        // US Letter when the page carries no MediaBox
        Ok((612.0, 792.0))
    }

    fn page_spans(&self, number: u32) -> Result<Vec<TextSpan>> {
        let page_id = self.page_id(number)?;
        let (_, height) = self.page_size(number)?;
        let (spans, _) = layout::extract_page(&self.doc, page_id, height)?;
        Ok(spans)
    }

    fn page_images(&self, number: u32) -> Result<Vec<ImageBlock>> {
        let page_id = self.page_id(number)?;
        let (_, height) = self.page_size(number)?;
        let (_, images) = layout::extract_page(&self.doc, page_id, height)?;
        Ok(images)
    }

    fn read_page(&self, number: u32) -> Result<VisualPage> {
        let page_id = self.page_id(number)?;
        let (width, height) = self.page_size(number)?;
        let (spans, images) = layout::extract_page(&self.doc, page_id, height)?;
        Ok(VisualPage {
            number,
            width,
            height,
            spans,
            images,
        })
    }
}
