//! Unified structural + visual representation of one document snapshot.

use serde::{Deserialize, Serialize};

use super::structure::StructuralDocument;
use super::visual::VisualLayout;

/// Margins measured from page-1 span coordinates, in centimeters.
///
/// The bottom margin is not derivable from span coordinates alone (trailing
/// whitespace is indistinguishable from margin), so only three axes are
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualMargins {
    pub top: f64,
    pub left: f64,
    pub right: f64,
}

/// Coarse document classification from total word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Short,
    ArticleOrReport,
    ThesisOrCapstone,
    DissertationOrThesis,
}

impl DocumentKind {
    /// Classify purely from total word count.
    pub fn from_word_count(words: usize) -> Self {
        if words < 500 {
            DocumentKind::Short
        } else if words < 3000 {
            DocumentKind::ArticleOrReport
        } else if words < 10000 {
            DocumentKind::ThesisOrCapstone
        } else {
            DocumentKind::DissertationOrThesis
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentKind::Short => "short",
            DocumentKind::ArticleOrReport => "article_or_report",
            DocumentKind::ThesisOrCapstone => "thesis_or_capstone",
            DocumentKind::DissertationOrThesis => "dissertation_or_thesis",
        };
        write!(f, "{s}")
    }
}

/// Element counts summarized across both models.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ElementCounts {
    pub paragraphs: usize,
    pub sections: usize,
    pub hierarchy_levels: usize,
    /// Page count when the visual model is available
    pub pages: Option<u32>,
}

/// Fast pre-flight compliance signal, independent of full issue detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickCheck {
    pub compliant: bool,
    pub issues: Vec<String>,
    pub total_issues: usize,
}

/// Derived diagnostics attached to a [`Vision`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionAnalysis {
    pub total_elements: ElementCounts,
    pub document_kind: DocumentKind,
    pub quick_check: QuickCheck,
}

/// The merged view of one document: structure, optional visual layout, and
/// derived diagnostics. `visual` is `None` when rendering was unavailable;
/// the vision is still usable for structure-only analysis and carries a
/// `note` explaining the degradation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vision {
    pub structure: StructuralDocument,
    pub visual: Option<VisualLayout>,
    pub visual_margins: Option<VisualMargins>,
    pub analysis: VisionAnalysis,
    pub note: Option<String>,
}

impl Vision {
    /// Whether the vision is running without a visual model.
    pub fn is_degraded(&self) -> bool {
        self.visual.is_none()
    }
}
