//! `word/styles.xml` parsing and effective-font resolution.
//!
//! Word resolves run formatting through a cascade: document defaults, then
//! the `basedOn` chain of the paragraph style, then direct run formatting.
//! The stylesheet here covers the first two layers; direct formatting lives
//! on the runs themselves.

use std::collections::{HashMap, HashSet};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::model::{RunFont, StyleCatalog, StyleEntry};

use super::xml::{get_attr, get_attr_f64, half_points_to_pt};

/// Font-related properties collected from an rPr block.
#[derive(Debug, Default, Clone)]
pub(crate) struct StyleProps {
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
}

impl StyleProps {
    fn apply(&mut self, name: &[u8], e: &BytesStart) {
        match name {
            b"w:rFonts" => {
                if let Some(f) = get_attr(e, b"w:ascii").or_else(|| get_attr(e, b"w:hAnsi")) {
                    self.font_name = Some(f);
                }
            }
            b"w:sz" => {
                if let Some(half) = get_attr_f64(e, b"w:val") {
                    self.font_size = Some(half_points_to_pt(half));
                }
            }
            b"w:color" => {
                if let Some(c) = get_attr(e, b"w:val") {
                    if c != "auto" {
                        self.font_color = Some(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn overlay(&self, font: &mut RunFont) {
        if self.font_name.is_some() {
            font.name = self.font_name.clone();
        }
        if self.font_size.is_some() {
            font.size = self.font_size;
        }
        if self.font_color.is_some() {
            font.color = self.font_color.clone();
        }
    }
}

/// One style definition.
#[derive(Debug, Clone)]
pub(crate) struct StyleDef {
    pub style_id: String,
    pub name: String,
    pub style_type: String,
    pub based_on: Option<String>,
    pub builtin: bool,
    pub is_default: bool,
    pub props: StyleProps,
}

/// Parsed stylesheet: document defaults plus styles in document order.
#[derive(Debug, Default)]
pub(crate) struct StyleSheet {
    defaults: StyleProps,
    styles: Vec<StyleDef>,
    by_id: HashMap<String, usize>,
}

impl StyleSheet {
    /// Parse `word/styles.xml`.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut in_doc_defaults = false;
        let mut current: Option<StyleDef> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    let name = e.name().as_ref().to_vec();
                    match name.as_slice() {
                        b"w:docDefaults" => in_doc_defaults = true,
                        b"w:style" => {
                            sheet.push_style(current.take());
                            current = Some(StyleDef {
                                style_id: get_attr(&e, b"w:styleId").unwrap_or_default(),
                                name: String::new(),
                                style_type: get_attr(&e, b"w:type")
                                    .unwrap_or_else(|| "paragraph".to_string()),
                                based_on: None,
                                builtin: get_attr(&e, b"w:customStyle").as_deref() != Some("1"),
                                is_default: get_attr(&e, b"w:default").as_deref() == Some("1"),
                                props: StyleProps::default(),
                            });
                        }
                        b"w:name" => {
                            if let (Some(style), Some(v)) = (current.as_mut(), get_attr(&e, b"w:val")) {
                                style.name = v;
                            }
                        }
                        b"w:basedOn" => {
                            if let Some(style) = current.as_mut() {
                                style.based_on = get_attr(&e, b"w:val");
                            }
                        }
                        b"w:rFonts" | b"w:sz" | b"w:color" => {
                            if in_doc_defaults {
                                sheet.defaults.apply(&name, &e);
                            } else if let Some(style) = current.as_mut() {
                                style.props.apply(&name, &e);
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"w:docDefaults" => in_doc_defaults = false,
                    b"w:style" => sheet.push_style(current.take()),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        sheet.push_style(current.take());
        Ok(sheet)
    }

    fn push_style(&mut self, style: Option<StyleDef>) {
        if let Some(mut style) = style {
            if style.name.is_empty() {
                style.name = style.style_id.clone();
            }
            self.by_id.insert(style.style_id.clone(), self.styles.len());
            self.styles.push(style);
        }
    }

    fn get(&self, style_id: &str) -> Option<&StyleDef> {
        self.by_id.get(style_id).map(|&i| &self.styles[i])
    }

    /// Display name for a style id, if defined.
    pub fn display_name(&self, style_id: &str) -> Option<&str> {
        self.get(style_id).map(|s| s.name.as_str())
    }

    /// Style id of the default paragraph style ("Normal" when undeclared).
    pub fn default_paragraph_style(&self) -> &str {
        self.styles
            .iter()
            .find(|s| s.is_default && s.style_type == "paragraph")
            .map(|s| s.style_id.as_str())
            .unwrap_or("Normal")
    }

    /// Resolve the effective font for a paragraph style: document defaults,
    /// then the basedOn chain from root ancestor down to the style itself.
    pub fn resolved_font(&self, style_id: &str) -> RunFont {
        let mut font = RunFont::default();
        self.defaults.overlay(&mut font);

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(style_id);
        while let Some(id) = cursor {
            if !visited.insert(id.to_string()) {
                break;
            }
            match self.get(id) {
                Some(def) => {
                    chain.push(def);
                    cursor = def.based_on.as_deref();
                }
                None => break,
            }
        }
        for def in chain.iter().rev() {
            def.props.overlay(&mut font);
        }
        font
    }

    /// Catalog of defined styles, split by type, in document order.
    pub fn catalog(&self) -> StyleCatalog {
        let mut catalog = StyleCatalog::default();
        for s in &self.styles {
            let entry = StyleEntry {
                name: s.name.clone(),
                style_id: s.style_id.clone(),
                builtin: s.builtin,
            };
            match s.style_type.as_str() {
                "paragraph" => catalog.paragraph_styles.push(entry),
                "character" => catalog.character_styles.push(entry),
                _ => {}
            }
        }
        catalog
    }
}
