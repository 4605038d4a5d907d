//! Streaming parse of `word/document.xml` and `docProps/core.xml`.
//!
//! Only body-level paragraphs become model paragraphs: anything inside
//! `w:tbl` or `w:txbxContent` is skipped, and runs inside `w:hyperlink` do
//! not contribute text. Sections are collected wherever a `w:sectPr`
//! appears, which yields document order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::model::{
    Alignment, Indent, LineSpacingRule, Margins, Metadata, Orientation, PageSize, Paragraph,
    Run, RunFont, Section, Spacing,
};

use super::styles::StyleSheet;
use super::xml::{
    alignment_from_jc, get_attr, get_attr_f64, half_points_to_pt, line_units_to_multiple,
    round2, twips_to_cm, twips_to_pt, val_is_off,
};

/// Body content of `word/document.xml`.
#[derive(Debug)]
pub(crate) struct ParsedBody {
    pub paragraphs: Vec<Paragraph>,
    pub sections: Vec<Section>,
}

/// Parse the main document part against an already-parsed stylesheet.
pub(crate) fn parse_document(xml: &[u8], sheet: &StyleSheet) -> Result<ParsedBody> {
    let mut reader = Reader::from_reader(xml);
    let mut parser = BodyParser::new(sheet);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => parser.handle_start(&e),
            Event::Empty(e) => parser.handle_empty(&e),
            Event::End(e) => parser.handle_end(e.name().as_ref()),
            Event::Text(t) => {
                let text = t.unescape()?;
                parser.handle_text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ParsedBody {
        paragraphs: parser.paragraphs,
        sections: parser.sections,
    })
}

#[derive(Debug, Default)]
struct RunState {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
    font: RunFont,
    in_rpr: bool,
    in_wt: bool,
}

#[derive(Debug, Default)]
struct ParaState {
    style_id: Option<String>,
    alignment: Alignment,
    spacing: Spacing,
    indent: Indent,
    runs: Vec<Run>,
    run: Option<RunState>,
    in_ppr: bool,
    in_mark_rpr: bool,
    hyperlink_depth: usize,
    nested: usize,
}

#[derive(Debug, Default)]
struct SectState {
    margins: Margins,
    page_size: Option<PageSize>,
    orientation: Orientation,
}

struct BodyParser<'a> {
    sheet: &'a StyleSheet,
    paragraphs: Vec<Paragraph>,
    sections: Vec<Section>,
    tbl_depth: usize,
    txbx_depth: usize,
    para: Option<ParaState>,
    sect: Option<SectState>,
}

impl<'a> BodyParser<'a> {
    fn new(sheet: &'a StyleSheet) -> Self {
        Self {
            sheet,
            paragraphs: Vec::new(),
            sections: Vec::new(),
            tbl_depth: 0,
            txbx_depth: 0,
            para: None,
            sect: None,
        }
    }

    fn skipping(&self) -> bool {
        self.tbl_depth > 0 || self.txbx_depth > 0
    }

    fn handle_start(&mut self, e: &BytesStart) {
        let name = e.name();
        let name = name.as_ref();
        match name {
            b"w:tbl" => {
                self.tbl_depth += 1;
                return;
            }
            b"w:txbxContent" => {
                self.txbx_depth += 1;
                return;
            }
            _ => {}
        }
        if self.skipping() {
            return;
        }
        match name {
            b"w:p" => match self.para.as_mut() {
                Some(p) => p.nested += 1,
                None => self.para = Some(ParaState::default()),
            },
            b"w:pPr" => {
                if let Some(p) = self.para.as_mut() {
                    p.in_ppr = true;
                }
            }
            b"w:r" => {
                if let Some(p) = self.para.as_mut() {
                    if p.nested == 0 && p.hyperlink_depth == 0 && !p.in_ppr {
                        p.run = Some(RunState::default());
                    }
                }
            }
            b"w:rPr" => {
                if let Some(p) = self.para.as_mut() {
                    match p.run.as_mut() {
                        Some(r) => r.in_rpr = true,
                        None if p.in_ppr => p.in_mark_rpr = true,
                        None => {}
                    }
                }
            }
            b"w:t" => {
                if let Some(r) = self.para.as_mut().and_then(|p| p.run.as_mut()) {
                    r.in_wt = true;
                }
            }
            b"w:hyperlink" => {
                if let Some(p) = self.para.as_mut() {
                    p.hyperlink_depth += 1;
                }
            }
            b"w:sectPr" => self.sect = Some(SectState::default()),
            _ => self.apply_property(name, e),
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        let name = e.name();
        let name = name.as_ref();
        if self.skipping() {
            return;
        }
        match name {
            // an empty <w:p/> is still a paragraph
            b"w:p" => {
                if self.para.is_none() {
                    self.para = Some(ParaState::default());
                    self.finish_paragraph();
                }
            }
            b"w:pPr" | b"w:r" | b"w:rPr" | b"w:t" | b"w:hyperlink" | b"w:sectPr" => {}
            _ => self.apply_property(name, e),
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:tbl" => {
                self.tbl_depth = self.tbl_depth.saturating_sub(1);
                return;
            }
            b"w:txbxContent" => {
                self.txbx_depth = self.txbx_depth.saturating_sub(1);
                return;
            }
            _ => {}
        }
        if self.skipping() {
            return;
        }
        match name {
            b"w:p" => {
                let nested = self.para.as_ref().map(|p| p.nested > 0).unwrap_or(false);
                if nested {
                    if let Some(p) = self.para.as_mut() {
                        p.nested -= 1;
                    }
                } else {
                    self.finish_paragraph();
                }
            }
            b"w:pPr" => {
                if let Some(p) = self.para.as_mut() {
                    p.in_ppr = false;
                }
            }
            b"w:r" => {
                if let Some(p) = self.para.as_mut() {
                    if let Some(r) = p.run.take() {
                        p.runs.push(Run {
                            text: r.text,
                            bold: r.bold,
                            italic: r.italic,
                            underline: r.underline,
                            font: r.font,
                        });
                    }
                }
            }
            b"w:rPr" => {
                if let Some(p) = self.para.as_mut() {
                    match p.run.as_mut() {
                        Some(r) => r.in_rpr = false,
                        None => p.in_mark_rpr = false,
                    }
                }
            }
            b"w:t" => {
                if let Some(r) = self.para.as_mut().and_then(|p| p.run.as_mut()) {
                    r.in_wt = false;
                }
            }
            b"w:hyperlink" => {
                if let Some(p) = self.para.as_mut() {
                    p.hyperlink_depth = p.hyperlink_depth.saturating_sub(1);
                }
            }
            b"w:sectPr" => self.finish_section(),
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        if let Some(r) = self.para.as_mut().and_then(|p| p.run.as_mut()) {
            if r.in_wt {
                r.text.push_str(text);
            }
        }
    }

    /// Leaf formatting elements, reachable as Start or Empty events.
    fn apply_property(&mut self, name: &[u8], e: &BytesStart) {
        // section page setup
        if let Some(s) = self.sect.as_mut() {
            match name {
                b"w:pgSz" => {
                    let width = get_attr_f64(e, b"w:w").map(|w| round2(twips_to_cm(w)));
                    let height = get_attr_f64(e, b"w:h").map(|h| round2(twips_to_cm(h)));
                    if let (Some(width), Some(height)) = (width, height) {
                        s.page_size = Some(PageSize { width, height });
                    }
                    if get_attr(e, b"w:orient").as_deref() == Some("landscape") {
                        s.orientation = Orientation::Landscape;
                    }
                    return;
                }
                b"w:pgMar" => {
                    s.margins.top = get_attr_f64(e, b"w:top").map(|v| round2(twips_to_cm(v)));
                    s.margins.bottom =
                        get_attr_f64(e, b"w:bottom").map(|v| round2(twips_to_cm(v)));
                    s.margins.left = get_attr_f64(e, b"w:left").map(|v| round2(twips_to_cm(v)));
                    s.margins.right = get_attr_f64(e, b"w:right").map(|v| round2(twips_to_cm(v)));
                    return;
                }
                _ => {}
            }
        }

        let Some(p) = self.para.as_mut() else { return };

        // run-level formatting
        if let Some(r) = p.run.as_mut() {
            if r.in_rpr {
                match name {
                    b"w:rFonts" => {
                        if let Some(f) =
                            get_attr(e, b"w:ascii").or_else(|| get_attr(e, b"w:hAnsi"))
                        {
                            r.font.name = Some(f);
                        }
                    }
                    b"w:sz" => {
                        if let Some(half) = get_attr_f64(e, b"w:val") {
                            r.font.size = Some(half_points_to_pt(half));
                        }
                    }
                    b"w:color" => {
                        if let Some(c) = get_attr(e, b"w:val") {
                            if c != "auto" {
                                r.font.color = Some(c);
                            }
                        }
                    }
                    b"w:b" => r.bold = !val_is_off(e),
                    b"w:i" => r.italic = !val_is_off(e),
                    b"w:u" => r.underline = !val_is_off(e),
                    _ => {}
                }
            } else {
                match name {
                    b"w:tab" => r.text.push('\t'),
                    b"w:br" | b"w:cr" => r.text.push('\n'),
                    _ => {}
                }
            }
            return;
        }

        // paragraph-level formatting
        if !p.in_ppr || p.in_mark_rpr {
            return;
        }
        match name {
            b"w:pStyle" => p.style_id = get_attr(e, b"w:val"),
            b"w:jc" => {
                if let Some(v) = get_attr(e, b"w:val") {
                    p.alignment = alignment_from_jc(&v);
                }
            }
            b"w:spacing" => {
                p.spacing.before = get_attr_f64(e, b"w:before").map(twips_to_pt);
                p.spacing.after = get_attr_f64(e, b"w:after").map(twips_to_pt);
                if let Some(line) = get_attr_f64(e, b"w:line") {
                    match get_attr(e, b"w:lineRule").as_deref() {
                        Some("exact") => {
                            p.spacing.line_spacing = Some(twips_to_pt(line));
                            p.spacing.rule = Some(LineSpacingRule::Exact);
                        }
                        Some("atLeast") => {
                            p.spacing.line_spacing = Some(twips_to_pt(line));
                            p.spacing.rule = Some(LineSpacingRule::AtLeast);
                        }
                        _ => {
                            p.spacing.line_spacing = Some(line_units_to_multiple(line));
                            p.spacing.rule = Some(LineSpacingRule::Auto);
                        }
                    }
                }
            }
            b"w:ind" => {
                p.indent.left = get_attr_f64(e, b"w:left")
                    .or_else(|| get_attr_f64(e, b"w:start"))
                    .map(|v| round2(twips_to_cm(v)));
                p.indent.right = get_attr_f64(e, b"w:right")
                    .or_else(|| get_attr_f64(e, b"w:end"))
                    .map(|v| round2(twips_to_cm(v)));
                if let Some(fl) = get_attr_f64(e, b"w:firstLine") {
                    p.indent.first_line = Some(round2(twips_to_cm(fl)));
                } else if let Some(h) = get_attr_f64(e, b"w:hanging") {
                    p.indent.first_line = Some(-round2(twips_to_cm(h)));
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(p) = self.para.take() else { return };
        let style_id = p
            .style_id
            .unwrap_or_else(|| self.sheet.default_paragraph_style().to_string());
        let style_name = self
            .sheet
            .display_name(&style_id)
            .unwrap_or(&style_id)
            .to_string();
        let effective_font = self.sheet.resolved_font(&style_id);
        let text: String = p.runs.iter().map(|r| r.text.as_str()).collect();
        self.paragraphs.push(Paragraph {
            index: self.paragraphs.len(),
            text,
            style_name,
            effective_font,
            alignment: p.alignment,
            spacing: p.spacing,
            indent: p.indent,
            runs: p.runs,
        });
    }

    fn finish_section(&mut self) {
        let Some(s) = self.sect.take() else { return };
        self.sections.push(Section {
            index: self.sections.len(),
            margins: s.margins,
            page_size: s.page_size,
            orientation: s.orientation,
        });
    }
}

/// Parse `docProps/core.xml` into document metadata.
pub(crate) fn parse_core_properties(xml: &[u8]) -> Result<Metadata> {
    #[derive(Clone, Copy, PartialEq)]
    enum Field {
        Title,
        Creator,
        Created,
        Modified,
    }

    let mut reader = Reader::from_reader(xml);
    let mut metadata = Metadata::default();
    let mut current: Option<Field> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                current = match e.name().as_ref() {
                    b"dc:title" => Some(Field::Title),
                    b"dc:creator" => Some(Field::Creator),
                    b"dcterms:created" => Some(Field::Created),
                    b"dcterms:modified" => Some(Field::Modified),
                    _ => None,
                };
                text.clear();
            }
            Event::Text(t) => {
                if current.is_some() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(_) => {
                match current.take() {
                    Some(Field::Title) if !text.is_empty() => {
                        metadata.title = Some(text.clone());
                    }
                    Some(Field::Creator) if !text.is_empty() => {
                        metadata.author = Some(text.clone());
                    }
                    Some(Field::Created) => metadata.created = parse_w3c_datetime(&text),
                    Some(Field::Modified) => metadata.modified = parse_w3c_datetime(&text),
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(metadata)
}

/// Parse a W3CDTF timestamp, accepting full RFC 3339, naive datetimes and
/// bare dates.
fn parse_w3c_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(DateTime::from_naive_utc_and_offset(ndt, Utc));
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc));
    }
    None
}
