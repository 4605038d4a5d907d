//! Document model types for structural-visual analysis.
//!
//! The model is split along the two extraction paths: [`structure`] holds
//! what the word-processing container declares (sections, paragraphs, runs,
//! styles), [`visual`] holds what a fixed-layout render actually shows
//! (pages, glyph-run boxes), and [`vision`] is the merged view consumed by
//! issue detection. The two sides never reference each other; they are
//! reconciled only by the merge step.

mod structure;
mod vision;
mod visual;

pub use structure::{
    Alignment, DocStatistics, HierarchyEntry, Indent, LineSpacingRule, Margins, Metadata,
    Orientation, PageSize, Paragraph, Run, RunFont, Section, Spacing, StructuralDocument,
    StyleCatalog, StyleEntry,
};
pub use vision::{
    DocumentKind, ElementCounts, QuickCheck, Vision, VisionAnalysis, VisualMargins,
};
pub use visual::{BBox, ImageBlock, TextSpan, VisualLayout, VisualPage};
