//! Structural + visual analysis: model merging, rule-based issue
//! detection, and paragraph classification.

mod classify;
mod issues;
mod merge;

pub use classify::{classify_paragraphs, ClassifiedParagraph, ParagraphClass};
pub use issues::{
    detect_issues, structural_compliance_score, Issue, IssueCategory, Severity,
    StructuralReviewer,
};
pub use merge::{measure_visual_margins, merge};
