//! Rule-based paragraph classification.
//!
//! A deterministic classifier from style names and text shape, available
//! without any external collaborator. An AI reviewer may refine these
//! labels; the rules below are the always-present fallback.

use serde::{Deserialize, Serialize};

use crate::model::{Paragraph, StructuralDocument};
use crate::norm::NormProfile;

/// Coarse paragraph role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphClass {
    /// Stand-alone all-caps line, typically a cover or chapter title
    Title,
    /// Styled heading
    Subtitle,
    /// Regular body text
    Body,
    /// Too short to classify (page numbers, separators, stray fragments)
    Other,
}

impl std::fmt::Display for ParagraphClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParagraphClass::Title => "title",
            ParagraphClass::Subtitle => "subtitle",
            ParagraphClass::Body => "body",
            ParagraphClass::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// One classified paragraph, carrying a preview rather than the full text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedParagraph {
    pub index: usize,
    pub text_preview: String,
    pub classification: ParagraphClass,
    pub style_name: String,
}

/// Classify every paragraph in the document.
pub fn classify_paragraphs(
    structure: &StructuralDocument,
    norm: &NormProfile,
) -> Vec<ClassifiedParagraph> {
    structure
        .paragraphs
        .iter()
        .map(|p| ClassifiedParagraph {
            index: p.index,
            text_preview: preview(&p.text),
            classification: classify(p, norm),
            style_name: p.style_name.clone(),
        })
        .collect()
}

fn classify(paragraph: &Paragraph, norm: &NormProfile) -> ParagraphClass {
    if norm
        .vocabulary
        .heading_level(&paragraph.style_name)
        .is_some()
    {
        return ParagraphClass::Subtitle;
    }

    let text = paragraph.text.trim();
    if text.chars().count() < 10 {
        return ParagraphClass::Other;
    }
    if is_all_caps(text) && text.chars().count() < 100 {
        return ParagraphClass::Title;
    }
    ParagraphClass::Body
}

/// At least one letter and none of them lowercase.
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 80;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let cut: String = text.chars().take(LIMIT).collect();
        format!("{cut}...")
    }
}
