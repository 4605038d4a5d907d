//! # docnorm
//!
//! Structural and visual analysis, repair, and validation of academic
//! document formatting.
//!
//! The crate reads a DOCX into a structural model, renders the file to a
//! fixed-layout PDF to measure the page geometry it actually produces,
//! merges both views, detects formatting non-conformities against a norm
//! profile (ABNT by default, APA included), compiles a prioritized plan of
//! idempotent fixes, executes it, and scores the repaired render 0-100
//! against the norm's numeric targets.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docnorm::{NormProfile, Pipeline, PipelineOptions};
//!
//! fn main() -> docnorm::Result<()> {
//!     let options = PipelineOptions::new().with_norm(NormProfile::abnt());
//!     let pipeline = Pipeline::new(options);
//!
//!     let report = pipeline.repair("tese.docx", "tese_corrigida.docx")?;
//!     println!(
//!         "{} issue(s) found, {}/{} action(s) applied",
//!         report.analysis.issues.len(),
//!         report.execution.successful_actions,
//!         report.execution.total_actions,
//!     );
//!     if let Some(validation) = &report.validation {
//!         println!("post-fix score: {}", validation.overall_score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two independent views**: declared DOCX structure and rendered PDF
//!   geometry, merged into one vision
//! - **Rule-based issue detection**: font, alignment, spacing, and indent
//!   consistency, margin conformity, expected-section presence
//! - **Idempotent repair**: a deterministic, priority-ordered action plan
//!   that touches only managed formatting properties
//! - **Faithful saving**: every untouched archive part is copied
//!   byte-for-byte
//! - **Visual validation**: margins, fonts, spacing, and alignment measured
//!   from the render and scored with per-norm tolerances
//! - **Degraded mode**: analysis still works when no PDF converter is
//!   available
//! - **Parallel extraction**: per-page span reads use Rayon

pub mod analysis;
pub mod detect;
pub mod docx;
pub mod error;
pub mod model;
pub mod norm;
pub mod pdf;
pub mod pipeline;
pub mod plan;
pub mod validate;

// Re-export commonly used types
pub use analysis::{
    classify_paragraphs, detect_issues, merge, structural_compliance_score, ClassifiedParagraph,
    Issue, IssueCategory, ParagraphClass, Severity, StructuralReviewer,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, is_pdf, DocFormat};
pub use docx::{extract_structure, DocxPackage};
pub use error::{Error, Result};
pub use model::{
    Alignment, Margins, Metadata, Paragraph, Run, Section, StructuralDocument, TextSpan, Vision,
    VisualLayout, VisualMargins, VisualPage,
};
pub use norm::{MarginTargets, NormProfile, SectionPattern, StyleVocabulary};
pub use pdf::{read_layout, LayoutConverter, LopdfBackend, PdfBackend, SofficeConverter};
pub use pipeline::{AnalysisReport, Pipeline, PipelineOptions, RepairReport};
pub use plan::{
    execute, plan_actions, Action, ActionOp, ActionOutcome, ActionStatus, ExecutionResult, Target,
};
pub use validate::{
    validate_layout, validate_pdf, ValidationCategory, ValidationIssue, ValidationResult,
};

use std::path::Path;

/// Analyze a document with a default pipeline.
///
/// # Example
///
/// ```no_run
/// let report = docnorm::analyze_file("tese.docx").unwrap();
/// println!("compliance score: {}", report.compliance_score);
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<AnalysisReport> {
    Pipeline::default().analyze(path)
}

/// Repair a document with a default pipeline, writing the result to `dest`.
///
/// # Example
///
/// ```no_run
/// let report = docnorm::repair_file("tese.docx", "tese_corrigida.docx").unwrap();
/// println!("success rate: {}%", report.execution.success_rate);
/// ```
pub fn repair_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<RepairReport> {
    Pipeline::default().repair(source, dest)
}

/// Validate a document with a default pipeline.
///
/// Accepts a rendered PDF directly or a DOCX, which is rendered first.
///
/// # Example
///
/// ```no_run
/// let result = docnorm::validate_file("tese_corrigida.pdf").unwrap();
/// println!("overall: {} (valid: {})", result.overall_score, result.overall_valid);
/// ```
pub fn validate_file<P: AsRef<Path>>(path: P) -> Result<ValidationResult> {
    Pipeline::default().validate(path)
}
