//! Formatting norm profiles and style vocabularies.
//!
//! A [`NormProfile`] carries every target value and tolerance the pipeline
//! compares against: expected margins, font, size, line spacing, alignment,
//! first-line indent, validation tolerances and pass thresholds, the list of
//! canonical sections the norm expects, and the style-name vocabulary used to
//! tell headings from body paragraphs. Nothing outside a profile hard-codes
//! norm numbers.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Alignment;

/// Expected page margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginTargets {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl MarginTargets {
    /// The four target axes as (name, value) pairs, in the same fixed order
    /// as [`crate::model::Margins::axes`].
    pub fn axes(&self) -> [(&'static str, f64); 4] {
        [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ]
    }
}

/// A canonical section the norm expects to find in the document.
///
/// `pattern` is a regular expression matched (case-insensitively) against
/// paragraph text; an invalid pattern simply never matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionPattern {
    pub name: String,
    pub pattern: String,
}

impl SectionPattern {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Compile the pattern, or `None` if it is invalid.
    pub fn regex(&self) -> Option<Regex> {
        Regex::new(&format!("(?i){}", self.pattern)).ok()
    }

    /// Whether the given paragraph text opens this section.
    pub fn matches(&self, text: &str) -> bool {
        self.regex().map(|re| re.is_match(text)).unwrap_or(false)
    }
}

/// Style-name vocabulary separating headings from body paragraphs.
///
/// Word stores localized heading style names ("heading 1", "Título 2"); the
/// vocabulary is injected into the issue detector and the executor so
/// locale-specific names can be swapped without touching pipeline logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleVocabulary {
    /// Lowercase prefixes that mark a heading style.
    pub heading_prefixes: Vec<String>,
}

impl Default for StyleVocabulary {
    fn default() -> Self {
        Self {
            heading_prefixes: vec!["heading".to_string(), "título".to_string()],
        }
    }
}

impl StyleVocabulary {
    /// Whether a style name denotes a heading (prefix match, case-insensitive).
    ///
    /// Body paragraphs are exactly the paragraphs for which this is false.
    pub fn is_heading(&self, style_name: &str) -> bool {
        let lower = style_name.to_lowercase();
        self.heading_prefixes.iter().any(|p| lower.starts_with(p))
    }

    /// Heading level for a style name, if the name mentions a heading
    /// vocabulary word anywhere. The level is the trailing digit of the
    /// name ("heading 2" → 2, "Título 3" → 3), defaulting to 1.
    pub fn heading_level(&self, style_name: &str) -> Option<u8> {
        let lower = style_name.to_lowercase();
        if !self.heading_prefixes.iter().any(|p| lower.contains(p.as_str())) {
            return None;
        }
        let trailing: String = lower
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        match trailing.parse::<u8>() {
            Ok(n) if (1..=9).contains(&n) => Some(n),
            _ => Some(1),
        }
    }
}

/// A named academic formatting standard with all its numeric targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormProfile {
    /// Profile name (e.g., "ABNT").
    pub name: String,
    /// Expected page margins in cm.
    pub margins_cm: MarginTargets,
    /// Font applied by repairs.
    pub font_name: String,
    /// Font size in points applied by repairs and checked by validation.
    pub font_size_pt: f64,
    /// Font-name substrings accepted during validation and quick checks.
    pub accepted_fonts: Vec<String>,
    /// Target line spacing multiple.
    pub line_spacing: f64,
    /// Target paragraph alignment.
    pub alignment: Alignment,
    /// Target first-line indent in cm.
    pub first_line_indent_cm: f64,
    /// Margin deviation tolerated by detection and validation, cm.
    pub margin_tolerance_cm: f64,
    /// Font-size deviation tolerated by validation, points.
    pub size_tolerance_pt: f64,
    /// Tolerated deviation of the mean line-gap ratio.
    pub spacing_ratio_tolerance: f64,
    /// Edge-alignment standard deviation limit, points.
    pub edge_deviation_limit_pt: f64,
    /// Overall score required for standalone validation to pass.
    pub pass_score: f64,
    /// Overall score required by the repair acceptance gate.
    pub acceptance_score: f64,
    /// Canonical sections the norm expects.
    pub expected_sections: Vec<SectionPattern>,
    /// Heading style vocabulary.
    pub vocabulary: StyleVocabulary,
}

impl NormProfile {
    /// ABNT NBR 14724 profile: 3/3 cm top/left, 2/2 cm bottom/right margins,
    /// Arial or Times New Roman 12 pt, 1.5 spacing, justified text, 1.25 cm
    /// first-line indent.
    pub fn abnt() -> Self {
        Self {
            name: "ABNT".to_string(),
            margins_cm: MarginTargets {
                top: 3.0,
                bottom: 2.0,
                left: 3.0,
                right: 2.0,
            },
            font_name: "Arial".to_string(),
            font_size_pt: 12.0,
            accepted_fonts: vec!["Arial".to_string(), "Times".to_string()],
            line_spacing: 1.5,
            alignment: Alignment::Justify,
            first_line_indent_cm: 1.25,
            margin_tolerance_cm: 0.3,
            size_tolerance_pt: 2.0,
            spacing_ratio_tolerance: 0.3,
            edge_deviation_limit_pt: 10.0,
            pass_score: 90.0,
            acceptance_score: 85.0,
            expected_sections: vec![
                SectionPattern::new("introduction", r"^\s*(\d+\.?\s*)?introdu[cç][aã]o\b"),
                SectionPattern::new(
                    "literature_review",
                    r"^\s*(\d+\.?\s*)?(referencial\s+te[oó]rico|revis[aã]o\s+(de|da)\s+literatura|fundamenta[cç][aã]o\s+te[oó]rica)",
                ),
                SectionPattern::new(
                    "methodology",
                    r"^\s*(\d+\.?\s*)?(metodologia|materiais\s+e\s+m[eé]todos|m[eé]todos?)\b",
                ),
                SectionPattern::new("results", r"^\s*(\d+\.?\s*)?resultados?\b"),
                SectionPattern::new(
                    "conclusion",
                    r"^\s*(\d+\.?\s*)?(conclus[aã]o|conclus[oõ]es|considera[cç][oõ]es\s+finais)",
                ),
                SectionPattern::new("references", r"^\s*(refer[eê]ncias|bibliografia)\b"),
            ],
            vocabulary: StyleVocabulary::default(),
        }
    }

    /// APA (7th edition) profile: 2.54 cm margins all around, Times New Roman
    /// 12 pt, double spacing, left-aligned text, 1.27 cm first-line indent.
    pub fn apa() -> Self {
        Self {
            name: "APA".to_string(),
            margins_cm: MarginTargets {
                top: 2.54,
                bottom: 2.54,
                left: 2.54,
                right: 2.54,
            },
            font_name: "Times New Roman".to_string(),
            font_size_pt: 12.0,
            accepted_fonts: vec!["Times".to_string(), "Calibri".to_string(), "Arial".to_string()],
            line_spacing: 2.0,
            alignment: Alignment::Left,
            first_line_indent_cm: 1.27,
            margin_tolerance_cm: 0.3,
            size_tolerance_pt: 2.0,
            spacing_ratio_tolerance: 0.3,
            edge_deviation_limit_pt: 10.0,
            pass_score: 90.0,
            acceptance_score: 85.0,
            expected_sections: vec![
                SectionPattern::new("introduction", r"^\s*(\d+\.?\s*)?introduction\b"),
                SectionPattern::new("method", r"^\s*(\d+\.?\s*)?methods?\b"),
                SectionPattern::new("results", r"^\s*(\d+\.?\s*)?results\b"),
                SectionPattern::new("discussion", r"^\s*(\d+\.?\s*)?discussion\b"),
                SectionPattern::new("references", r"^\s*references\b"),
            ],
            vocabulary: StyleVocabulary::default(),
        }
    }

    /// Look up a profile by name, case-insensitively.
    pub fn named(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "abnt" => Some(Self::abnt()),
            "apa" => Some(Self::apa()),
            _ => None,
        }
    }

    /// Expected mean line-gap ratio for spacing validation.
    ///
    /// A gap ratio of `line_spacing - 1.0` corresponds to the extra leading
    /// between consecutive lines (0.5 for 1.5 spacing).
    pub fn expected_spacing_ratio(&self) -> f64 {
        self.line_spacing - 1.0
    }

    /// Whether a font name belongs to one of the accepted families.
    ///
    /// Case-insensitive substring match, so "Times New Roman" and embedded
    /// names like "TimesNewRomanPSMT" both satisfy "Times".
    pub fn accepts_font(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.accepted_fonts
            .iter()
            .any(|family| name.contains(&family.to_lowercase()))
    }

    /// Override the standalone pass threshold.
    pub fn with_pass_score(mut self, score: f64) -> Self {
        self.pass_score = score;
        self
    }

    /// Override the acceptance-gate threshold.
    pub fn with_acceptance_score(mut self, score: f64) -> Self {
        self.acceptance_score = score;
        self
    }

    /// Override the heading vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: StyleVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }
}

impl Default for NormProfile {
    fn default() -> Self {
        Self::abnt()
    }
}
