//! Content-stream geometry for fixed-layout pages.
//!
//! Text spans are decoded with their position, font, and effective size, then
//! flipped into the top-left coordinate system of [`crate::model`]. The line
//! and block grouping used for visual measurement lives here as well.

use std::collections::HashMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{BBox, ImageBlock, TextSpan};

/// Kerning adjustment (in 1/1000 text-space units) beyond which a `TJ`
/// operand is treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Fetch and concatenate the content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = page_dict
        .get(b"Contents")
        .map_err(|e| Error::Parse(e.to_string()))?;

    match contents {
        Object::Reference(r) => {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                return s
                    .decompressed_content()
                    .map_err(|e| Error::Parse(e.to_string()));
            }
            Err(Error::Parse("invalid content stream".to_string()))
        }
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Reference(r) = obj {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::Parse("invalid content stream".to_string())),
    }
}

/// Resolve the names of image XObjects declared in the page resources.
fn image_names(doc: &LopdfDocument, page_id: ObjectId) -> Vec<Vec<u8>> {
    let mut names = Vec::new();
    let Ok(page_dict) = doc.get_dictionary(page_id) else {
        return names;
    };
    let Ok(res) = page_dict.get(b"Resources") else {
        return names;
    };
    let res_dict = match res {
        Object::Reference(r) => doc.get_dictionary(*r).ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    };
    let Some(res_dict) = res_dict else {
        return names;
    };
    let Ok(xobjects) = res_dict.get(b"XObject") else {
        return names;
    };
    let xobj_dict = match xobjects {
        Object::Reference(r) => doc.get_dictionary(*r).ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    };
    let Some(xobj_dict) = xobj_dict else {
        return names;
    };
    for (name, obj) in xobj_dict.iter() {
        let is_image = obj
            .as_reference()
            .ok()
            .and_then(|r| doc.get_object(r).ok())
            .and_then(|o| match o {
                Object::Stream(s) => s.dict.get(b"Subtype").ok().cloned(),
                _ => None,
            })
            .and_then(|s| s.as_name().map(|n| n.to_vec()).ok())
            .map(|n| n == b"Image")
            .unwrap_or(false);
        if is_image {
            names.push(name.clone());
        }
    }
    names
}

/// Extract every text span and image block of a page.
///
/// `page_height` is the MediaBox height used to flip coordinates into the
/// top-left origin.
pub(crate) fn extract_page(
    doc: &LopdfDocument,
    page_id: ObjectId,
    page_height: f32,
) -> Result<(Vec<TextSpan>, Vec<ImageBlock>)> {
    let lopdf_fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::Parse(e.to_string()))?;

    // Display names and encodings, resolved once per page.
    let mut font_names: HashMap<Vec<u8>, String> = HashMap::new();
    let mut encodings = HashMap::new();
    for (name, font) in &lopdf_fonts {
        let base = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)))
            .unwrap_or_else(|| "Unknown".to_string());
        font_names.insert(name.clone(), base);
        encodings.insert(name.clone(), font.get_font_encoding(doc).ok());
    }

    let images = image_names(doc, page_id);

    let content = page_content(doc, page_id)?;
    let content =
        lopdf::content::Content::decode(&content).map_err(|e| Error::Parse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut blocks = Vec::new();

    let mut current_font = String::new();
    let mut current_font_res: Vec<u8> = Vec::new();
    let mut current_font_size: f32 = 12.0;
    let mut current_color = "#000000".to_string();
    let mut text_matrix = TextMatrix::default();
    let mut in_text_block = false;
    let mut ctm = Ctm::default();
    let mut ctm_stack: Vec<Ctm> = Vec::new();

    for op in content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(prev) = ctm_stack.pop() {
                    ctm = prev;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let m = Ctm {
                        a: get_number(&op.operands[0]).unwrap_or(1.0),
                        b: get_number(&op.operands[1]).unwrap_or(0.0),
                        c: get_number(&op.operands[2]).unwrap_or(0.0),
                        d: get_number(&op.operands[3]).unwrap_or(1.0),
                        e: get_number(&op.operands[4]).unwrap_or(0.0),
                        f: get_number(&op.operands[5]).unwrap_or(0.0),
                    };
                    ctm = m.then(&ctm);
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    if images.iter().any(|n| n == name) {
                        blocks.push(ImageBlock {
                            bbox: unit_square_bbox(&ctm, page_height),
                        });
                    }
                }
            }
            "BT" => {
                in_text_block = true;
                text_matrix = TextMatrix::default();
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(font_name) = &op.operands[0] {
                        current_font_res = font_name.clone();
                        current_font = font_names
                            .get(font_name.as_slice())
                            .cloned()
                            .unwrap_or_else(|| {
                                String::from_utf8_lossy(font_name.as_slice()).to_string()
                            });
                    }
                    current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    text_matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    text_matrix.set(
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => {
                text_matrix.next_line();
            }
            "rg" => {
                if op.operands.len() >= 3 {
                    current_color = hex_color(
                        get_number(&op.operands[0]).unwrap_or(0.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                    );
                }
            }
            "g" => {
                if let Some(v) = op.operands.first().and_then(get_number) {
                    current_color = hex_color(v, v, v);
                }
            }
            "Tj" | "TJ" => {
                if in_text_block {
                    let encoding = encodings.get(&current_font_res).and_then(|e| e.as_ref());

                    let text = if op.operator == "TJ" {
                        if let Some(Object::Array(arr)) = op.operands.first() {
                            let mut combined = String::new();
                            for item in arr {
                                match item {
                                    Object::String(bytes, _) => {
                                        if let Some(enc) = encoding {
                                            if let Ok(decoded) =
                                                LopdfDocument::decode_text(enc, bytes)
                                            {
                                                combined.push_str(&decoded);
                                            }
                                        } else {
                                            combined.push_str(&decode_text_simple(bytes));
                                        }
                                    }
                                    Object::Integer(n) => {
                                        push_tj_space(&mut combined, -(*n as f32));
                                    }
                                    Object::Real(n) => {
                                        push_tj_space(&mut combined, -n);
                                    }
                                    _ => {}
                                }
                            }
                            combined
                        } else {
                            String::new()
                        }
                    } else if let Some(Object::String(bytes, _)) = op.operands.first() {
                        if let Some(enc) = encoding {
                            LopdfDocument::decode_text(enc, bytes).unwrap_or_default()
                        } else {
                            decode_text_simple(bytes)
                        }
                    } else {
                        String::new()
                    };

                    if !text.trim().is_empty() {
                        spans.push(make_span(
                            text,
                            &text_matrix,
                            current_font_size,
                            &current_font,
                            &current_color,
                            page_height,
                        ));
                    }
                }
            }
            "'" | "\"" => {
                text_matrix.next_line();
                if in_text_block {
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                        let encoding = encodings.get(&current_font_res).and_then(|e| e.as_ref());
                        let text = if let Some(enc) = encoding {
                            LopdfDocument::decode_text(enc, bytes).unwrap_or_default()
                        } else {
                            decode_text_simple(bytes)
                        };
                        if !text.trim().is_empty() {
                            spans.push(make_span(
                                text,
                                &text_matrix,
                                current_font_size,
                                &current_font,
                                &current_color,
                                page_height,
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "extracted {} spans, {} images from page object {:?}",
        spans.len(),
        blocks.len(),
        page_id
    );

    Ok((spans, blocks))
}

/// Build a model span from the current text state.
///
/// The baseline position is flipped into the top-left origin; the ascender
/// and descender are approximated as 0.8 and 0.2 of the effective size. Width
/// comes from a per-character estimate since glyph metrics are not loaded.
fn make_span(
    text: String,
    matrix: &TextMatrix,
    font_size: f32,
    font_name: &str,
    color: &str,
    page_height: f32,
) -> TextSpan {
    let (x, y) = matrix.get_position();
    let size = font_size * matrix.get_scale();
    let width = estimate_width(&text, size);
    let bbox = BBox::new(
        x,
        page_height - (y + size * 0.8),
        x + width,
        page_height - (y - size * 0.2),
    );
    TextSpan::new(text, bbox, size, font_name).with_color(color)
}

/// Estimate rendered width without glyph metrics: half the font size per
/// character, full size for spaceless-script (CJK) characters.
fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars()
        .map(|c| {
            if is_spaceless_script_char(c) {
                size
            } else {
                size * 0.5
            }
        })
        .sum()
}

/// Append a word space for a large negative `TJ` kerning adjustment.
fn push_tj_space(combined: &mut String, adjustment: f32) {
    if adjustment <= TJ_SPACE_THRESHOLD {
        return;
    }
    if combined.is_empty() || combined.ends_with(' ') || combined.ends_with('\u{00A0}') {
        return;
    }
    if let Some(c) = combined.chars().last() {
        if !is_spaceless_script_char(c) {
            combined.push(' ');
        }
    }
}

/// Simple text decoding fallback when no font encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Check if a character is from a script that does not use word spaces
/// (Chinese and Japanese; Korean uses spaces and is excluded).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2A6DF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Strip the six-uppercase-letter subset prefix from an embedded font name
/// (`BAAAAA+LiberationSerif` reads as `LiberationSerif`).
fn strip_subset_prefix(name: &str) -> String {
    let bytes = name.as_bytes();
    if bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(|b| b.is_ascii_uppercase()) {
        name[7..].to_string()
    } else {
        name.to_string()
    }
}

fn hex_color(r: f32, g: f32, b: f32) -> String {
    let to_byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Text matrix for tracking position in the content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    #[allow(clippy::many_single_char_names)]
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; a TL operator would override this.
        self.f -= 12.0 * self.d;
    }

    fn get_position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn get_scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Current transformation matrix, tracked only for image placement.
#[derive(Debug, Clone, Copy)]
struct Ctm {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Ctm {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Ctm {
    /// Compose: apply `self` first, then `after`.
    fn then(&self, after: &Ctm) -> Ctm {
        Ctm {
            a: self.a * after.a + self.b * after.c,
            b: self.a * after.b + self.b * after.d,
            c: self.c * after.a + self.d * after.c,
            d: self.c * after.b + self.d * after.d,
            e: self.e * after.a + self.f * after.c + after.e,
            f: self.e * after.b + self.f * after.d + after.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

/// Bounding box of the CTM-transformed unit square, flipped to top-left.
fn unit_square_bbox(ctm: &Ctm, page_height: f32) -> BBox {
    let corners = [
        ctm.apply(0.0, 0.0),
        ctm.apply(1.0, 0.0),
        ctm.apply(0.0, 1.0),
        ctm.apply(1.0, 1.0),
    ];
    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for (x, y) in corners {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    BBox::new(min_x, page_height - max_y, max_x, page_height - min_y)
}

/// A line of spans sharing a baseline, in reading order.
#[derive(Debug, Clone)]
pub struct Line {
    /// Spans sorted by left edge
    pub spans: Vec<TextSpan>,
    /// Union of span boxes
    pub bbox: BBox,
    /// Dominant font size, weighted by text length
    pub font_size: f32,
}

impl Line {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let bbox = spans
            .iter()
            .skip(1)
            .fold(spans[0].bbox, |acc, s| acc.union(&s.bbox));

        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans[0].font_size
        };

        Self {
            spans,
            bbox,
            font_size,
        }
    }

    /// Combined text, inserting a space where the horizontal gap between
    /// spans exceeds a fifth of the font size.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.bbox.x0 - prev.bbox.x1;
                if gap > self.font_size * 0.2
                    && !prev.text.ends_with(' ')
                    && !span.text.starts_with(' ')
                {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }
        result
    }
}

/// A block of consecutive lines separated from its neighbors by extra
/// spacing, a font size change, or an indentation shift.
#[derive(Debug, Clone)]
pub struct Block {
    pub lines: Vec<Line>,
    pub bbox: BBox,
}

impl Block {
    fn from_lines(lines: Vec<Line>) -> Self {
        let bbox = lines
            .iter()
            .skip(1)
            .fold(lines[0].bbox, |acc, l| acc.union(&l.bbox));
        Self { lines, bbox }
    }
}

/// Group page spans into lines by vertical proximity.
///
/// Spans whose bottom edges sit within 30% of the font size of each other
/// are treated as one baseline. Lines come back in top-to-bottom order.
pub fn group_into_lines(spans: &[TextSpan]) -> Vec<Line> {
    if spans.is_empty() {
        return Vec::new();
    }

    let mut spans: Vec<TextSpan> = spans.to_vec();
    spans.sort_by(|a, b| {
        let y_cmp = a
            .bbox
            .y1
            .partial_cmp(&b.bbox.y1)
            .unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.bbox
                .x0
                .partial_cmp(&b.bbox.x0)
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.bbox.y1 - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(Line::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.bbox.y1);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line::from_spans(current));
    }

    lines
}

/// Group lines into blocks for margin and spacing measurement.
pub fn group_into_blocks(lines: Vec<Line>) -> Vec<Block> {
    if lines.is_empty() {
        return Vec::new();
    }

    let avg_spacing = average_line_spacing(&lines);

    let mut blocks = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if block_break(prev, &line, avg_spacing) {
                blocks.push(Block::from_lines(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(Block::from_lines(current));
    }

    blocks
}

fn average_line_spacing(lines: &[Line]) -> f32 {
    if lines.len() < 2 {
        return 12.0;
    }

    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| w[1].bbox.y0 - w[0].bbox.y0)
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn block_break(prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
    let spacing = curr.bbox.y0 - prev.bbox.y0;
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    if (prev.font_size - curr.font_size).abs() > 1.0 {
        return true;
    }

    // Indentation shift
    if (prev.bbox.x0 - curr.bbox.x0).abs() > 20.0 {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    const PAGE_HEIGHT: f32 = 842.0;

    fn build_pdf(content: &str) -> (LopdfDocument, ObjectId) {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 10,
                "Height" => 10,
            },
            vec![0u8; 100],
        ));
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.as_bytes().to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "Im1" => image_id },
            },
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        (doc, page_id)
    }

    fn span_at(x: f32, y0: f32, width: f32, size: f32) -> TextSpan {
        TextSpan::new("x", BBox::new(x, y0, x + width, y0 + size), size, "Helvetica")
    }

    #[test]
    fn test_simple_tj_span() {
        let (doc, page_id) = build_pdf("BT /F1 12 Tf 72 770 Td (Hello) Tj ET");
        let (spans, _) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();

        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.text, "Hello");
        assert_eq!(span.font_name, "Helvetica");
        assert!((span.font_size - 12.0).abs() < 0.01);
        assert!((span.bbox.x0 - 72.0).abs() < 0.01);
        // Baseline 770 bottom-up: top = 842 - (770 + 9.6), bottom = 842 - (770 - 2.4)
        assert!((span.bbox.y0 - 62.4).abs() < 0.01);
        assert!((span.bbox.y1 - 74.4).abs() < 0.01);
        assert!((span.bbox.height() - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_tj_array_word_space() {
        let (doc, page_id) = build_pdf("BT /F1 12 Tf 72 770 Td [(A) -300 (B)] TJ ET");
        let (spans, _) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();
        assert_eq!(spans[0].text, "A B");
    }

    #[test]
    fn test_tj_array_kerning_keeps_word_joined() {
        let (doc, page_id) = build_pdf("BT /F1 12 Tf 72 770 Td [(Va) -50 (lue)] TJ ET");
        let (spans, _) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();
        assert_eq!(spans[0].text, "Value");
    }

    #[test]
    fn test_whitespace_only_text_dropped() {
        let (doc, page_id) = build_pdf("BT /F1 12 Tf 72 770 Td (   ) Tj ET");
        let (spans, _) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_fill_color_tracked() {
        let (doc, page_id) = build_pdf("BT /F1 12 Tf 1 0 0 rg 72 770 Td (Red) Tj ET");
        let (spans, _) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();
        assert_eq!(spans[0].color, "#ff0000");
    }

    #[test]
    fn test_tm_scale_applies_to_size() {
        let (doc, page_id) = build_pdf("BT /F1 12 Tf 2 0 0 2 72 770 Tm (Big) Tj ET");
        let (spans, _) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();
        assert!((spans[0].font_size - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_image_placement() {
        let (doc, page_id) = build_pdf("q 100 0 0 50 72 700 cm /Im1 Do Q");
        let (_, images) = extract_page(&doc, page_id, PAGE_HEIGHT).unwrap();

        assert_eq!(images.len(), 1);
        let bbox = images[0].bbox;
        assert!((bbox.x0 - 72.0).abs() < 0.01);
        assert!((bbox.x1 - 172.0).abs() < 0.01);
        assert!((bbox.y0 - 92.0).abs() < 0.01);
        assert!((bbox.y1 - 142.0).abs() < 0.01);
    }

    #[test]
    fn test_subset_prefix_stripped() {
        assert_eq!(strip_subset_prefix("BAAAAA+LiberationSerif"), "LiberationSerif");
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("ab+X"), "ab+X");
    }

    #[test]
    fn test_decode_text_simple_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_text_simple(&bytes), "AB");
    }

    #[test]
    fn test_estimate_width_cjk_wider() {
        let latin = estimate_width("ab", 12.0);
        let cjk = estimate_width("\u{4E00}\u{4E8C}", 12.0);
        assert!((latin - 12.0).abs() < 0.01);
        assert!((cjk - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_group_into_lines() {
        let spans = vec![
            span_at(72.0, 100.0, 50.0, 12.0),
            span_at(130.0, 100.0, 40.0, 12.0),
            span_at(72.0, 118.0, 60.0, 12.0),
        ];
        let lines = group_into_lines(&spans);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[1].spans.len(), 1);
        assert!(lines[0].bbox.y0 < lines[1].bbox.y0);
    }

    #[test]
    fn test_line_text_inserts_gap_space() {
        let mut a = span_at(72.0, 100.0, 30.0, 12.0);
        a.text = "left".to_string();
        let mut b = span_at(110.0, 100.0, 30.0, 12.0);
        b.text = "right".to_string();

        let lines = group_into_lines(&[a, b]);
        assert_eq!(lines[0].text(), "left right");
    }

    #[test]
    fn test_group_into_blocks_breaks_on_gap() {
        let spans = vec![
            span_at(72.0, 100.0, 200.0, 12.0),
            span_at(72.0, 114.0, 200.0, 12.0),
            span_at(72.0, 128.0, 200.0, 12.0),
            // Wide gap: new paragraph
            span_at(72.0, 180.0, 200.0, 12.0),
            span_at(72.0, 194.0, 200.0, 12.0),
        ];
        let lines = group_into_lines(&spans);
        let blocks = group_into_blocks(lines);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines.len(), 3);
        assert_eq!(blocks[1].lines.len(), 2);
    }

    #[test]
    fn test_group_into_blocks_breaks_on_size_change() {
        let spans = vec![
            span_at(72.0, 100.0, 200.0, 16.0),
            span_at(72.0, 120.0, 200.0, 12.0),
        ];
        let lines = group_into_lines(&spans);
        let blocks = group_into_blocks(lines);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_block_bbox_is_union() {
        let spans = vec![
            span_at(72.0, 100.0, 200.0, 12.0),
            span_at(90.0, 114.0, 150.0, 12.0),
        ];
        let lines = group_into_lines(&spans);
        let blocks = group_into_blocks(lines);

        assert_eq!(blocks.len(), 1);
        let bbox = blocks[0].bbox;
        assert!((bbox.x0 - 72.0).abs() < 0.01);
        assert!((bbox.x1 - 272.0).abs() < 0.01);
        assert!((bbox.y0 - 100.0).abs() < 0.01);
        assert!((bbox.y1 - 126.0).abs() < 0.01);
    }
}
