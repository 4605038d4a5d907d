//! Structural document model extracted from word-processing containers.
//!
//! Every field mirrors what the container actually stores: missing optional
//! properties are `None`, never silently defaulted. Units are centimeters for
//! page geometry and indents, points for font sizes and paragraph spacing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Core document properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creation timestamp
    pub created: Option<DateTime<Utc>>,

    /// Last modification timestamp
    pub modified: Option<DateTime<Utc>>,
}

/// Page margins in centimeters, rounded to 2 decimals at extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl Margins {
    /// The four margin axes as (name, value) pairs, in a fixed order.
    pub fn axes(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ]
    }
}

/// Page size in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// A document section with its page setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section position in document order
    pub index: usize,

    /// Page margins
    pub margins: Margins,

    /// Page dimensions
    pub page_size: Option<PageSize>,

    /// Page orientation
    pub orientation: Orientation,
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Justified text
    Justify,
    /// Left alignment
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// No explicit alignment set
    #[default]
    Unset,
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Alignment::Justify => "justify",
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Unset => "unset",
        };
        write!(f, "{s}")
    }
}

/// How a `line_spacing` value is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSpacingRule {
    /// Multiple of single line height (1.5, 2.0, ...)
    Auto,
    /// Minimum height in points
    AtLeast,
    /// Fixed height in points
    Exact,
}

/// Paragraph spacing properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    /// Space before the paragraph in points
    pub before: Option<f64>,

    /// Space after the paragraph in points
    pub after: Option<f64>,

    /// Line spacing value, interpreted per `rule`
    pub line_spacing: Option<f64>,

    /// Interpretation rule for `line_spacing`
    pub rule: Option<LineSpacingRule>,
}

/// Paragraph indentation in centimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indent {
    pub left: Option<f64>,
    pub right: Option<f64>,
    /// First-line indent; negative for hanging indents
    pub first_line: Option<f64>,
}

/// Run-level font properties. `None` means the run does not override the
/// value and inherits it from the paragraph style cascade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFont {
    /// Font name
    pub name: Option<String>,

    /// Font size in points
    pub size: Option<f64>,

    /// Text color as an RRGGBB hex string
    pub color: Option<String>,
}

/// A run of text with consistent formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Bold formatting
    pub bold: bool,

    /// Italic formatting
    pub italic: bool,

    /// Underline formatting
    pub underline: bool,

    /// Run-level font overrides
    pub font: RunFont,
}

impl Run {
    /// Create a plain run with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A paragraph with its resolved formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Position in document order; `paragraphs[i].index == i`
    pub index: usize,

    /// Concatenated run text
    pub text: String,

    /// Resolved style name (falls back to the style id when unnamed)
    pub style_name: String,

    /// Font resolved from document defaults and the style `basedOn` cascade
    pub effective_font: RunFont,

    /// Paragraph alignment
    pub alignment: Alignment,

    /// Spacing properties
    pub spacing: Spacing,

    /// Indentation properties
    pub indent: Indent,

    /// Ordered text runs
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Whether the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One entry in the style catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleEntry {
    /// Display name of the style
    pub name: String,

    /// Internal style id
    pub style_id: String,

    /// Whether the style is application-defined rather than user-defined
    pub builtin: bool,
}

/// Catalog of the styles defined in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleCatalog {
    pub paragraph_styles: Vec<StyleEntry>,
    pub character_styles: Vec<StyleEntry>,
}

impl StyleCatalog {
    /// Total number of cataloged styles.
    pub fn total(&self) -> usize {
        self.paragraph_styles.len() + self.character_styles.len()
    }
}

/// A heading in the document's structural hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyEntry {
    /// Index of the heading paragraph
    pub paragraph_index: usize,

    /// Heading level (1-based)
    pub level: u8,

    /// Heading text (truncated to 100 characters)
    pub text: String,

    /// Style name that marked this paragraph as a heading
    pub style_name: String,
}

/// Exact document statistics accumulated over every run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocStatistics {
    /// Total paragraph count
    pub total_paragraphs: usize,

    /// Paragraphs with non-whitespace text
    pub non_empty_paragraphs: usize,

    /// Words across non-empty paragraphs
    pub total_words: usize,

    /// Characters across non-empty paragraphs
    pub total_characters: usize,

    /// Mean words per non-empty paragraph
    pub avg_words_per_paragraph: f64,

    /// Occurrences of each run-level font name
    pub fonts_used: BTreeMap<String, usize>,

    /// Occurrences of each run-level font size (key built by [`Self::size_key`])
    pub font_sizes_used: BTreeMap<String, usize>,
}

impl DocStatistics {
    /// Canonical histogram key for a font size: rounded to one decimal,
    /// formatted without a trailing `.0`.
    pub fn size_key(size: f64) -> String {
        let rounded = (size * 10.0).round() / 10.0;
        format!("{rounded}")
    }

    /// Record one run-level font name occurrence.
    pub fn note_font(&mut self, name: &str) {
        *self.fonts_used.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Record one run-level font size occurrence.
    pub fn note_size(&mut self, size: f64) {
        *self.font_sizes_used.entry(Self::size_key(size)).or_insert(0) += 1;
    }

    /// Most frequent run-level font name, if any run declared one.
    pub fn dominant_font(&self) -> Option<&str> {
        dominant_key(&self.fonts_used).map(String::as_str)
    }

    /// Most frequent run-level font size, if any run declared one.
    pub fn dominant_size(&self) -> Option<f64> {
        dominant_key(&self.font_sizes_used).and_then(|k| k.parse().ok())
    }
}

/// Key with the highest count; ties resolve to the lexicographically
/// smallest key so the result is deterministic.
fn dominant_key(map: &BTreeMap<String, usize>) -> Option<&String> {
    let mut best: Option<(&String, usize)> = None;
    for (key, &count) in map {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(k, _)| k)
}

/// The complete structural model of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralDocument {
    /// Core document properties
    pub metadata: Metadata,

    /// Sections in document order
    pub sections: Vec<Section>,

    /// Body-level paragraphs in document order
    pub paragraphs: Vec<Paragraph>,

    /// Style catalog
    pub styles: StyleCatalog,

    /// Heading hierarchy
    pub hierarchy: Vec<HierarchyEntry>,

    /// Exact statistics
    pub statistics: DocStatistics,
}

impl StructuralDocument {
    /// Number of distinct heading levels present.
    pub fn hierarchy_levels(&self) -> usize {
        let mut levels: Vec<u8> = self.hierarchy.iter().map(|h| h.level).collect();
        levels.sort_unstable();
        levels.dedup();
        levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_key_formatting() {
        assert_eq!(DocStatistics::size_key(12.0), "12");
        assert_eq!(DocStatistics::size_key(11.5), "11.5");
        assert_eq!(DocStatistics::size_key(12.04), "12");
        assert_eq!(DocStatistics::size_key(10.25), "10.3");
    }

    #[test]
    fn test_dominant_font() {
        let mut stats = DocStatistics::default();
        stats.note_font("Arial");
        stats.note_font("Arial");
        stats.note_font("Calibri");
        assert_eq!(stats.dominant_font(), Some("Arial"));
    }

    #[test]
    fn test_dominant_size() {
        let mut stats = DocStatistics::default();
        stats.note_size(12.0);
        stats.note_size(12.0);
        stats.note_size(10.0);
        assert_eq!(stats.dominant_size(), Some(12.0));
    }

    #[test]
    fn test_dominant_tie_is_deterministic() {
        let mut stats = DocStatistics::default();
        stats.note_font("Verdana");
        stats.note_font("Arial");
        assert_eq!(stats.dominant_font(), Some("Arial"));
    }

    #[test]
    fn test_empty_histograms() {
        let stats = DocStatistics::default();
        assert_eq!(stats.dominant_font(), None);
        assert_eq!(stats.dominant_size(), None);
    }

    #[test]
    fn test_margin_axes_order() {
        let margins = Margins {
            top: Some(3.0),
            bottom: Some(2.0),
            left: Some(3.0),
            right: Some(2.0),
        };
        let names: Vec<&str> = margins.axes().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["top", "bottom", "left", "right"]);
    }

    #[test]
    fn test_paragraph_is_empty() {
        let p = Paragraph {
            index: 0,
            text: "   ".to_string(),
            style_name: "Normal".to_string(),
            effective_font: RunFont::default(),
            alignment: Alignment::Unset,
            spacing: Spacing::default(),
            indent: Indent::default(),
            runs: vec![],
        };
        assert!(p.is_empty());
    }

    #[test]
    fn test_alignment_serde() {
        let json = serde_json::to_string(&Alignment::Justify).unwrap();
        assert_eq!(json, "\"justify\"");
        let back: Alignment = serde_json::from_str("\"unset\"").unwrap();
        assert_eq!(back, Alignment::Unset);
    }

    #[test]
    fn test_hierarchy_levels() {
        let doc = StructuralDocument {
            metadata: Metadata::default(),
            sections: vec![],
            paragraphs: vec![],
            styles: StyleCatalog::default(),
            hierarchy: vec![
                HierarchyEntry {
                    paragraph_index: 0,
                    level: 1,
                    text: "Intro".to_string(),
                    style_name: "Heading 1".to_string(),
                },
                HierarchyEntry {
                    paragraph_index: 3,
                    level: 2,
                    text: "Background".to_string(),
                    style_name: "Heading 2".to_string(),
                },
                HierarchyEntry {
                    paragraph_index: 7,
                    level: 1,
                    text: "Methods".to_string(),
                    style_name: "Heading 1".to_string(),
                },
            ],
            statistics: DocStatistics::default(),
        };
        assert_eq!(doc.hierarchy_levels(), 2);
    }
}
