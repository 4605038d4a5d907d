//! End-to-end pipeline tests over in-memory DOCX fixtures and mock
//! converters, covering analysis, repair, saving, and validation.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Stream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use docnorm::plan::{AlignmentParams, FontParams, SpacingParams};
use docnorm::{
    execute, extract_structure, Action, ActionOp, ActionStatus, Alignment, Error, IssueCategory,
    LayoutConverter, NormProfile, Pipeline, PipelineOptions, Result, Target,
};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

/// Builds a minimal DOCX package one paragraph at a time.
struct DocBuilder {
    body: String,
    margins: (u32, u32, u32, u32),
}

impl DocBuilder {
    fn new() -> Self {
        Self {
            body: String::new(),
            // ABNT-exact: 3/2/3/2 cm in twips
            margins: (1701, 1134, 1701, 1134),
        }
    }

    fn margins(mut self, top: u32, bottom: u32, left: u32, right: u32) -> Self {
        self.margins = (top, bottom, left, right);
        self
    }

    /// A body paragraph with conforming properties: justified, 1.5 line
    /// spacing, 1.25 cm first-line indent. Size is in half-points.
    fn paragraph(mut self, text: &str, font: &str, half_points: u32) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:jc w:val="both"/><w:spacing w:line="360" w:lineRule="auto"/><w:ind w:firstLine="709"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="{font}"/><w:sz w:val="{half_points}"/></w:rPr><w:t>{text}</w:t></w:r></w:p>"#
        ));
        self
    }

    fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    fn bytes(&self) -> Vec<u8> {
        let (top, bottom, left, right) = self.margins;
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="{top}" w:bottom="{bottom}" w:left="{left}" w:right="{right}"/></w:sectPr></w:body></w:document>"#,
            self.body
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn write(&self, dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, self.bytes()).unwrap();
        path
    }
}

/// Fully conforming ABNT document, canonical sections included.
fn conforming_doc() -> DocBuilder {
    DocBuilder::new()
        .paragraph("1 INTRODUÇÃO", "Arial", 24)
        .paragraph(
            "Este trabalho apresenta o contexto e os objetivos da pesquisa.",
            "Arial",
            24,
        )
        .paragraph("2 REFERENCIAL TEÓRICO", "Arial", 24)
        .paragraph(
            "A literatura recente fundamenta as escolhas metodológicas.",
            "Arial",
            24,
        )
        .paragraph("3 METODOLOGIA", "Arial", 24)
        .paragraph(
            "Os dados foram coletados em três etapas consecutivas.",
            "Arial",
            24,
        )
        .paragraph("4 RESULTADOS", "Arial", 24)
        .paragraph("Uma tendência consistente aparece em todas as etapas.", "Arial", 24)
        .paragraph("5 CONCLUSÃO", "Arial", 24)
        .paragraph(
            "As hipóteses iniciais foram confirmadas pela análise.",
            "Arial",
            24,
        )
        .paragraph("REFERÊNCIAS", "Arial", 24)
}

/// Three font variants across five body paragraphs; everything else
/// conforms, so the plan reduces to a single font fix.
fn two_font_doc() -> DocBuilder {
    DocBuilder::new()
        .paragraph(
            "A pesquisa parte de uma revisão abrangente da literatura.",
            "Arial",
            24,
        )
        .paragraph(
            "Os dados foram coletados em três etapas consecutivas.",
            "Arial",
            24,
        )
        .paragraph(
            "Cada etapa utilizou instrumentos validados previamente.",
            "Arial",
            24,
        )
        .paragraph(
            "Uma tendência consistente aparece nas medições preliminares.",
            "Times New Roman",
            24,
        )
        .paragraph(
            "A análise final confirma as hipóteses iniciais.",
            "Times New Roman",
            22,
        )
}

/// Wrong top margin plus mixed fonts, alignments, spacings and indents:
/// every actionable category at once.
fn messy_doc() -> DocBuilder {
    DocBuilder::new()
        .margins(1134, 1134, 1701, 1134)
        .paragraph(
            "Primeiro parágrafo segue a formatação padrão do modelo.",
            "Arial",
            24,
        )
        .paragraph(
            "Segundo parágrafo mantém a mesma formatação de corpo.",
            "Arial",
            24,
        )
        .raw(
            r#"<w:p><w:pPr><w:jc w:val="left"/><w:spacing w:line="480" w:lineRule="auto"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Times New Roman"/><w:sz w:val="24"/></w:rPr><w:t>Terceiro parágrafo foge da fonte e do espaçamento.</w:t></w:r></w:p>"#,
        )
        .raw(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="Times New Roman"/><w:sz w:val="22"/></w:rPr><w:t>Quarto parágrafo sem propriedades de parágrafo.</w:t></w:r></w:p>"#,
        )
}

/// Converter stand-in for machines without LibreOffice.
struct UnavailableConverter;

impl LayoutConverter for UnavailableConverter {
    fn convert_to_pdf(&self, _input: &Path, _output: &Path) -> Result<()> {
        Err(Error::RenderUnavailable("soffice not installed".to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock converter that renders every document as the same compliant page.
struct FixedRenderConverter;

impl LayoutConverter for FixedRenderConverter {
    fn convert_to_pdf(&self, _input: &Path, output: &Path) -> Result<()> {
        write_compliant_pdf(output)
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// One A4 page of justified Arial 12 with 3/2/3/2 cm margins and 18 pt
/// line steps (1.5 spacing).
fn write_compliant_pdf(path: &Path) -> Result<()> {
    let text = "m".repeat(75);
    let mut content = String::new();
    for k in 0..39 {
        let y = 747.36 - 18.0 * f64::from(k);
        content.push_str(&format!("BT /F1 12 Tf 85.04 {y:.2} Td ({text}) Tj ET\n"));
    }

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Arial",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    });
    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

fn offline_pipeline() -> Pipeline {
    Pipeline::default().with_converter(Box::new(UnavailableConverter))
}

fn rendered_pipeline() -> Pipeline {
    Pipeline::default().with_converter(Box::new(FixedRenderConverter))
}

#[test]
fn test_conforming_document_yields_clean_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = conforming_doc().write(&dir, "tese.docx");

    let report = rendered_pipeline().analyze(&path).unwrap();

    assert!(
        report.issues.is_empty(),
        "unexpected issues: {:?}",
        report.issues
    );
    assert!(report.plan.is_empty());
    assert_eq!(report.compliance_score, 100);
    assert!(!report.vision.is_degraded());
    assert!(report.vision.visual_margins.is_some());
}

#[test]
fn test_conforming_repair_saves_verbatim_copy() {
    let dir = tempfile::tempdir().unwrap();
    let source = conforming_doc().write(&dir, "tese.docx");
    let dest = dir.path().join("tese_corrigida.docx");

    let report = rendered_pipeline().repair(&source, &dest).unwrap();

    assert_eq!(report.execution.total_actions, 0);
    assert_eq!(fs::read(&source).unwrap(), fs::read(&dest).unwrap());

    let validation = report.validation.unwrap();
    assert!(validation.overall_valid);
    assert!(validation.overall_score >= 90.0);
    assert_eq!(report.meets_acceptance, Some(true));
}

#[test]
fn test_minority_fonts_collapse_into_one_standardize_action() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_font_doc().write(&dir, "artigo.docx");

    let report = offline_pipeline().analyze(&path).unwrap();

    let issue = report
        .issues
        .iter()
        .find(|i| i.category == IssueCategory::InconsistentFonts)
        .unwrap();
    // The fix rewrites the whole body, not just the minority paragraphs.
    assert_eq!(issue.affected_count, 5);

    assert_eq!(report.plan.len(), 1);
    let action = &report.plan[0];
    assert_eq!(action.priority, 1);
    assert_eq!(action.target, Target::AllBody);
    assert_eq!(
        action.op,
        ActionOp::FixFont(FontParams {
            name: "Arial".to_string(),
            size: 12.0,
        })
    );
}

#[test]
fn test_font_repair_rewrites_every_body_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = two_font_doc().write(&dir, "artigo.docx");
    let dest = dir.path().join("artigo_corrigido.docx");

    offline_pipeline().repair(&source, &dest).unwrap();

    let repaired = extract_structure(&dest).unwrap();
    assert_eq!(repaired.paragraphs.len(), 5);
    for paragraph in &repaired.paragraphs {
        assert_eq!(paragraph.alignment, Alignment::Justify);
        for run in &paragraph.runs {
            assert_eq!(run.font.name.as_deref(), Some("Arial"));
            assert_eq!(run.font.size, Some(12.0));
        }
    }
    // Text content survives untouched.
    assert!(repaired.paragraphs[4].text.contains("hipóteses iniciais"));
}

#[test]
fn test_render_failure_degrades_but_keeps_structural_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = messy_doc().write(&dir, "rascunho.docx");

    let report = offline_pipeline().analyze(&path).unwrap();

    assert!(report.vision.is_degraded());
    assert!(report.vision.visual_margins.is_none());
    let note = report.vision.note.as_deref().unwrap();
    assert!(note.contains("structure-only"), "note: {note}");
    // Structural rules still produce the full plan.
    assert_eq!(report.plan.len(), 5);
}

#[test]
fn test_messy_document_plan_follows_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let path = messy_doc().write(&dir, "rascunho.docx");

    let report = offline_pipeline().analyze(&path).unwrap();

    assert_eq!(report.issues.len(), 6);
    assert_eq!(report.compliance_score, 60);

    let margin_issue = report
        .issues
        .iter()
        .find(|i| i.category == IssueCategory::Margins)
        .unwrap();
    assert!(margin_issue.description.contains("top 2cm (expected 3cm)"));
    assert!(!margin_issue.description.contains("left"));

    let names: Vec<&str> = report.plan.iter().map(|a| a.op.name()).collect();
    assert_eq!(
        names,
        ["fix_margin", "fix_font", "fix_spacing", "fix_alignment", "fix_indent"]
    );
    let priorities: Vec<u32> = report.plan.iter().map(|a| a.priority).collect();
    assert_eq!(priorities, [1, 2, 3, 4, 5]);
    assert_eq!(report.plan[0].target, Target::Section(0));
}

#[test]
fn test_full_repair_applies_plan_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let source = messy_doc().write(&dir, "rascunho.docx");
    let dest = dir.path().join("rascunho_corrigido.docx");

    let report = rendered_pipeline().repair(&source, &dest).unwrap();

    assert_eq!(report.execution.total_actions, 5);
    assert_eq!(report.execution.successful_actions, 5);
    assert_eq!(report.execution.failed_actions, 0);
    assert_eq!(report.execution.success_rate, 100.0);
    assert_eq!(report.output_path, dest);

    let validation = report.validation.as_ref().unwrap();
    assert!(validation.overall_valid);
    assert_eq!(report.meets_acceptance, Some(true));

    // A second analysis of the repaired file has nothing left to plan.
    let follow_up = offline_pipeline().analyze(&dest).unwrap();
    assert!(follow_up.plan.is_empty(), "leftover plan: {:?}", follow_up.plan);
    assert!(follow_up
        .issues
        .iter()
        .all(|i| i.category == IssueCategory::Structure));
}

#[test]
fn test_bad_selector_is_isolated_during_execution() {
    let dir = tempfile::tempdir().unwrap();
    let path = conforming_doc().write(&dir, "tese.docx");
    let mut document = extract_structure(&path).unwrap();

    let plan = vec![
        Action {
            priority: 1,
            target: Target::Paragraph(500),
            op: ActionOp::FixAlignment(AlignmentParams {
                alignment: Alignment::Justify,
            }),
            description: "justify one paragraph".to_string(),
        },
        Action {
            priority: 2,
            target: Target::AllBody,
            op: ActionOp::FixSpacing(SpacingParams { line_spacing: 1.5 }),
            description: "set body line spacing".to_string(),
        },
    ];

    let result = execute(&mut document, &plan, &NormProfile::abnt().vocabulary);

    assert_eq!(result.total_actions, 2);
    assert_eq!(result.failed_actions, 1);
    assert_eq!(result.successful_actions, 1);
    assert_eq!(result.outcomes[0].status, ActionStatus::Error);
    assert_eq!(result.outcomes[0].message, "paragraph 500 does not exist");
    assert_eq!(result.outcomes[1].status, ActionStatus::Success);
}

#[test]
fn test_analysis_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = messy_doc().write(&dir, "rascunho.docx");
    let pipeline = offline_pipeline();

    let first = pipeline.analyze(&path).unwrap();
    let second = pipeline.analyze(&path).unwrap();

    assert_eq!(first.compliance_score, second.compliance_score);
    assert_eq!(first.plan, second.plan);
    assert_eq!(
        serde_json::to_string(&first.issues).unwrap(),
        serde_json::to_string(&second.issues).unwrap()
    );
}

#[test]
fn test_validate_pdf_input_needs_no_converter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.pdf");
    write_compliant_pdf(&path).unwrap();

    let verdict = offline_pipeline().validate(&path).unwrap();

    assert!(verdict.overall_valid);
    assert!(verdict.overall_score >= 90.0);
    assert_eq!(verdict.total_issues, 0);
}

#[test]
fn test_intermediate_render_is_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = conforming_doc().write(&dir, "tese.docx");

    rendered_pipeline().analyze(&path).unwrap();

    assert!(!dir.path().join("tese.render.pdf").exists());
}

#[test]
fn test_keep_renders_retains_intermediate() {
    let dir = tempfile::tempdir().unwrap();
    let path = conforming_doc().write(&dir, "tese.docx");

    let pipeline = Pipeline::new(PipelineOptions::new().with_keep_renders(true))
        .with_converter(Box::new(FixedRenderConverter));
    pipeline.analyze(&path).unwrap();

    assert!(dir.path().join("tese.render.pdf").exists());
}

#[test]
fn test_report_serializes_with_wire_action_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = messy_doc().write(&dir, "rascunho.docx");

    let report = offline_pipeline().analyze(&path).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["compliance_score"], 60);
    assert_eq!(value["plan"][0]["action"], "fix_margin");
    assert_eq!(value["plan"][0]["target"], "section_0");
    assert_eq!(value["plan"][0]["params"]["top"], 3.0);
    assert_eq!(value["issues"].as_array().map(Vec::len), Some(6));
    assert!(value["vision"]["note"].is_string());
}
