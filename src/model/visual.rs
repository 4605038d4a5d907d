//! Visual layout model read from fixed-layout page documents.
//!
//! All coordinates are in points (72 pt = 1 inch = 2.54 cm) with the origin
//! at the top-left corner of the page and y increasing downward. The model
//! stays in points; consumers convert to centimeters where a norm requires
//! it.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A run of glyphs sharing font and position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,

    /// Bounding box in page coordinates
    pub bbox: BBox,

    /// Font name as reported by the page resources
    pub font_name: String,

    /// Effective font size in points
    pub font_size: f32,

    /// Fill color as an RRGGBB hex string
    pub color: String,

    /// Whether the font appears to be bold
    pub bold: bool,

    /// Whether the font appears to be italic
    pub italic: bool,
}

impl TextSpan {
    /// Create a span, inferring bold/italic flags from the font name.
    pub fn new(text: impl Into<String>, bbox: BBox, font_size: f32, font_name: impl Into<String>) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");
        Self {
            text: text.into(),
            bbox,
            font_name,
            font_size,
            color: "#000000".to_string(),
            bold,
            italic,
        }
    }

    /// Replace the fill color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// A positioned image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Bounding box in page coordinates
    pub bbox: BBox,
}

/// One page of the visual layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualPage {
    /// 1-based page number
    pub number: u32,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text spans on the page
    pub spans: Vec<TextSpan>,

    /// Image blocks on the page
    pub images: Vec<ImageBlock>,
}

impl VisualPage {
    /// Create an empty A4 page (595 x 842 pt).
    pub fn a4(number: u32) -> Self {
        Self {
            number,
            width: 595.0,
            height: 842.0,
            spans: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Create an empty US Letter page (612 x 792 pt).
    pub fn letter(number: u32) -> Self {
        Self {
            number,
            width: 612.0,
            height: 792.0,
            spans: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// The visual layout of a rendered document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualLayout {
    /// Total page count
    pub total_pages: u32,

    /// Pages in order
    pub pages: Vec<VisualPage>,
}

impl VisualLayout {
    pub fn new(pages: Vec<VisualPage>) -> Self {
        Self {
            total_pages: pages.len() as u32,
            pages,
        }
    }

    pub fn first_page(&self) -> Option<&VisualPage> {
        self.pages.first()
    }
}
