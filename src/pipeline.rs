//! End-to-end orchestration of analysis, repair, and validation.
//!
//! A [`Pipeline`] owns the layout converter and an optional structural
//! reviewer and drives the full flow: extract the structural model, render
//! and read the visual model, merge both into a vision, detect issues, plan
//! and execute fixes, save the patched package, then re-render and score the
//! result. Rendering failures degrade the run to structure-only analysis
//! instead of aborting it; the vision carries a note when that happens.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{
    classify_paragraphs, detect_issues, merge, structural_compliance_score, ClassifiedParagraph,
    Issue, StructuralReviewer,
};
use crate::detect::{detect_format_from_path, DocFormat};
use crate::docx::DocxPackage;
use crate::error::{Error, Result};
use crate::model::{VisualLayout, Vision};
use crate::norm::NormProfile;
use crate::pdf::{self, LayoutConverter, SofficeConverter};
use crate::plan::{execute, plan_actions, Action, ExecutionResult};
use crate::validate::{validate_layout, validate_pdf, ValidationResult};

const DEGRADED_NOTE: &str = "fixed-layout render unavailable; analysis is structure-only";

/// Tuning knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Target formatting norm
    pub norm: NormProfile,
    /// Parallel per-page span extraction
    pub parallel: bool,
    /// Timeout for the external converter
    pub render_timeout: Duration,
    /// Keep intermediate renders next to their source instead of deleting them
    pub keep_renders: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            norm: NormProfile::abnt(),
            parallel: true,
            render_timeout: Duration::from_secs(30),
            keep_renders: false,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_norm(mut self, norm: NormProfile) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn with_keep_renders(mut self, keep: bool) -> Self {
        self.keep_renders = keep;
        self
    }
}

/// Everything the analysis stage produced for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub vision: Vision,
    pub issues: Vec<Issue>,
    /// Issue-count band score, distinct from the validator's measured score
    pub compliance_score: u8,
    pub classifications: Vec<ClassifiedParagraph>,
    pub plan: Vec<Action>,
}

/// Aggregate result of one repair run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairReport {
    pub analysis: AnalysisReport,
    pub execution: ExecutionResult,
    pub output_path: PathBuf,
    /// None when the post-fix render was unavailable
    pub validation: Option<ValidationResult>,
    /// Post-fix score against the norm's acceptance threshold
    pub meets_acceptance: Option<bool>,
}

/// The analysis/repair/validation pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    converter: Box<dyn LayoutConverter>,
    reviewer: Option<Box<dyn StructuralReviewer>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl Pipeline {
    /// Build a pipeline with the default LibreOffice converter.
    pub fn new(options: PipelineOptions) -> Self {
        let converter = SofficeConverter::new().with_timeout(options.render_timeout);
        Self {
            options,
            converter: Box::new(converter),
            reviewer: None,
        }
    }

    /// Replace the layout converter.
    pub fn with_converter(mut self, converter: Box<dyn LayoutConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Attach a structural reviewer whose issues augment the rule-based list.
    pub fn with_reviewer(mut self, reviewer: Box<dyn StructuralReviewer>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// The active norm profile.
    pub fn norm(&self) -> &NormProfile {
        &self.options.norm
    }

    /// Analyze a document: vision, issues, classifications, and action plan.
    ///
    /// Rendering failures are recovered into a degraded vision with
    /// `visual: None` and a note; every other error aborts.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisReport> {
        let path = path.as_ref();
        let package = DocxPackage::open(path)?;
        self.analyze_package(&package, path)
    }

    /// Repair a document: analyze, execute the plan, save to `dest`, then
    /// re-render the saved file and score it.
    ///
    /// An empty plan still saves (a verbatim copy) and still validates, so
    /// the report always describes the file at `dest`.
    pub fn repair<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        dest: Q,
    ) -> Result<RepairReport> {
        let source = source.as_ref();
        let dest = dest.as_ref();

        let package = DocxPackage::open(source)?;
        let analysis = self.analyze_package(&package, source)?;

        let mut document = analysis.vision.structure.clone();
        let execution = execute(&mut document, &analysis.plan, &self.options.norm.vocabulary);
        package.save(&document, dest)?;
        debug!("saved repaired document to {}", dest.display());

        let validation = match self.render_layout(dest) {
            Ok(layout) => Some(validate_layout(&layout, &self.options.norm)),
            Err(Error::RenderUnavailable(reason)) => {
                warn!("post-fix validation skipped: {reason}");
                None
            }
            Err(err) => return Err(err),
        };
        let meets_acceptance = validation
            .as_ref()
            .map(|v| v.overall_score >= self.options.norm.acceptance_score);

        Ok(RepairReport {
            analysis,
            execution,
            output_path: dest.to_path_buf(),
            validation,
            meets_acceptance,
        })
    }

    /// Validate a document against the norm's visual targets.
    ///
    /// A PDF is scored directly; a DOCX is rendered first. Unlike analysis,
    /// validation cannot degrade, so a failed render is an error here.
    pub fn validate<P: AsRef<Path>>(&self, path: P) -> Result<ValidationResult> {
        let path = path.as_ref();
        match detect_format_from_path(path)? {
            DocFormat::Pdf => validate_pdf(path, &self.options.norm),
            DocFormat::Docx => {
                let layout = self.render_layout(path)?;
                Ok(validate_layout(&layout, &self.options.norm))
            }
        }
    }

    fn analyze_package(&self, package: &DocxPackage, path: &Path) -> Result<AnalysisReport> {
        let structure = package.extract()?;

        let (visual, note) = match self.render_layout(path) {
            Ok(layout) => (Some(layout), None),
            Err(Error::RenderUnavailable(reason)) => {
                warn!("degrading to structure-only analysis: {reason}");
                (None, Some(DEGRADED_NOTE.to_string()))
            }
            Err(err) => return Err(err),
        };

        let norm = &self.options.norm;
        let mut vision = merge(structure, visual, norm);
        vision.note = note;

        let mut issues = detect_issues(&vision, norm);
        if let Some(reviewer) = &self.reviewer {
            match reviewer.review(&vision, norm) {
                Ok(extra) => {
                    debug!("reviewer contributed {} issue(s)", extra.len());
                    issues.extend(extra);
                }
                Err(err) => warn!("structural reviewer skipped: {err}"),
            }
        }

        let compliance_score = structural_compliance_score(issues.len());
        let classifications = classify_paragraphs(&vision.structure, norm);
        let plan = plan_actions(&issues, &vision.structure, norm);
        debug!(
            "analysis found {} issue(s) (score {}), planned {} action(s)",
            issues.len(),
            compliance_score,
            plan.len()
        );

        Ok(AnalysisReport {
            vision,
            issues,
            compliance_score,
            classifications,
            plan,
        })
    }

    /// Render `source` and read its visual layout, removing the intermediate
    /// file unless renders are kept.
    fn render_layout(&self, source: &Path) -> Result<VisualLayout> {
        let render = self.render(source)?;
        pdf::read_layout_with(render.path(), self.options.parallel)
    }

    fn render(&self, source: &Path) -> Result<TempRender> {
        let path = render_path(source);
        self.converter.convert_to_pdf(source, &path)?;
        Ok(TempRender {
            path,
            keep: self.options.keep_renders,
        })
    }
}

/// Where the intermediate render of `source` is written.
fn render_path(source: &Path) -> PathBuf {
    source.with_extension("render.pdf")
}

/// Deletes the rendered file on drop unless renders are kept.
struct TempRender {
    path: PathBuf,
    keep: bool,
}

impl TempRender {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempRender {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            debug!("render cleanup failed for {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{IssueCategory, Severity};
    use crate::docx;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    struct NoConverter;

    impl LayoutConverter for NoConverter {
        fn convert_to_pdf(&self, _input: &Path, _output: &Path) -> Result<()> {
            Err(Error::RenderUnavailable("disabled in tests".to_string()))
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    struct OneIssueReviewer;

    impl StructuralReviewer for OneIssueReviewer {
        fn review(&self, _vision: &Vision, _norm: &NormProfile) -> Result<Vec<Issue>> {
            Ok(vec![Issue {
                category: IssueCategory::Structure,
                severity: Severity::Low,
                description: "abstract is missing".to_string(),
                recommendation: None,
                affected_count: 0,
            }])
        }
    }

    struct FailingReviewer;

    impl StructuralReviewer for FailingReviewer {
        fn review(&self, _vision: &Vision, _norm: &NormProfile) -> Result<Vec<Issue>> {
            Err(Error::Other("reviewer backend offline".to_string()))
        }
    }

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    // 2.0cm top margin where ABNT wants 3.0: one margin issue, one action.
    const DOC_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:sz w:val="24"/></w:rPr><w:t>Primeiro parágrafo do corpo do trabalho.</w:t></w:r></w:p><w:p><w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:sz w:val="24"/></w:rPr><w:t>Segundo parágrafo do corpo do trabalho.</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:bottom="1134" w:left="1701" w:right="1134"/></w:sectPr></w:body></w:document>"#;

    fn docx_bytes() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(DOC_XML.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn write_docx(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("trabalho.docx");
        fs::write(&path, docx_bytes()).unwrap();
        path
    }

    fn offline_pipeline() -> Pipeline {
        Pipeline::default().with_converter(Box::new(NoConverter))
    }

    #[test]
    fn test_options_builder() {
        let options = PipelineOptions::new()
            .with_norm(NormProfile::apa())
            .with_parallel(false)
            .with_render_timeout(Duration::from_secs(5))
            .with_keep_renders(true);

        assert_eq!(options.norm.name, "APA");
        assert!(!options.parallel);
        assert_eq!(options.render_timeout, Duration::from_secs(5));
        assert!(options.keep_renders);

        let defaults = PipelineOptions::default();
        assert_eq!(defaults.norm.name, "ABNT");
        assert!(defaults.parallel);
        assert!(!defaults.keep_renders);
    }

    #[test]
    fn test_render_path_naming() {
        assert_eq!(
            render_path(Path::new("/tmp/tese.docx")),
            PathBuf::from("/tmp/tese.render.pdf")
        );
    }

    #[test]
    fn test_temp_render_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.render.pdf");
        fs::write(&path, b"%PDF-1.5").unwrap();

        drop(TempRender {
            path: path.clone(),
            keep: false,
        });
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_render_kept_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.render.pdf");
        fs::write(&path, b"%PDF-1.5").unwrap();

        drop(TempRender {
            path: path.clone(),
            keep: true,
        });
        assert!(path.exists());
    }

    #[test]
    fn test_analyze_missing_file() {
        let err = offline_pipeline().analyze("/nonexistent/tese.docx").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_degraded_analysis_without_converter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(&dir);

        let report = offline_pipeline().analyze(&path).unwrap();

        assert!(report.vision.is_degraded());
        assert!(report.vision.visual_margins.is_none());
        assert_eq!(report.vision.note.as_deref(), Some(DEGRADED_NOTE));

        // Structural rules still ran: the 2cm top margin is flagged and planned.
        assert!(report
            .issues
            .iter()
            .any(|i| i.category == IssueCategory::Margins));
        assert_eq!(report.plan.len(), 1);
        assert_eq!(report.plan[0].priority, 1);
    }

    #[test]
    fn test_reviewer_issues_merge_into_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(&dir);

        let baseline = offline_pipeline().analyze(&path).unwrap();
        let reviewed = offline_pipeline()
            .with_reviewer(Box::new(OneIssueReviewer))
            .analyze(&path)
            .unwrap();

        assert_eq!(reviewed.issues.len(), baseline.issues.len() + 1);
        assert!(reviewed
            .issues
            .iter()
            .any(|i| i.description == "abstract is missing"));
        // The extra issue does not grow the plan; structure issues are not fixable.
        assert_eq!(reviewed.plan.len(), baseline.plan.len());
    }

    #[test]
    fn test_failing_reviewer_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(&dir);

        let baseline = offline_pipeline().analyze(&path).unwrap();
        let reviewed = offline_pipeline()
            .with_reviewer(Box::new(FailingReviewer))
            .analyze(&path)
            .unwrap();

        assert_eq!(reviewed.issues.len(), baseline.issues.len());
    }

    #[test]
    fn test_repair_fixes_margins_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_docx(&dir);
        let dest = dir.path().join("trabalho_corrigido.docx");

        let report = offline_pipeline().repair(&source, &dest).unwrap();

        assert_eq!(report.execution.total_actions, 1);
        assert_eq!(report.execution.successful_actions, 1);
        assert_eq!(report.execution.success_rate, 100.0);
        assert_eq!(report.output_path, dest);
        // No converter: the post-fix validation is skipped, not failed.
        assert!(report.validation.is_none());
        assert_eq!(report.meets_acceptance, None);

        let repaired = docx::extract_structure(&dest).unwrap();
        let margins = &repaired.sections[0].margins;
        assert_eq!(margins.top, Some(3.0));
        assert_eq!(margins.bottom, Some(2.0));
        assert_eq!(margins.left, Some(3.0));
        assert_eq!(margins.right, Some(2.0));
    }

    #[test]
    fn test_repair_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_docx(&dir);
        let first = dir.path().join("first.docx");
        let second = dir.path().join("second.docx");

        offline_pipeline().repair(&source, &first).unwrap();
        let report = offline_pipeline().repair(&first, &second).unwrap();

        // The repaired document plans nothing further and survives byte-identical.
        assert!(report.analysis.plan.is_empty());
        assert_eq!(report.execution.total_actions, 0);
        assert_eq!(report.execution.success_rate, 0.0);
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"plain text, not a document").unwrap();

        let err = offline_pipeline().validate(&path).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_validate_docx_requires_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_docx(&dir);

        let err = offline_pipeline().validate(&path).unwrap_err();
        assert!(matches!(err, Error::RenderUnavailable(_)));
    }
}
