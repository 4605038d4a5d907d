//! Rule-based detection of formatting non-conformities.
//!
//! Consistency rules operate on body paragraphs only. Headings legitimately
//! differ in font, size and alignment, so the norm's style vocabulary exempts
//! them. Each rule emits at most one issue, which lets the planner map issue
//! categories to actions without deduplicating.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Paragraph, StructuralDocument, Vision};
use crate::norm::NormProfile;

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        write!(f, "{s}")
    }
}

/// What kind of non-conformity an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    InconsistentFonts,
    InconsistentAlignment,
    InconsistentSpacing,
    InconsistentIndent,
    Margins,
    Structure,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IssueCategory::InconsistentFonts => "inconsistent_fonts",
            IssueCategory::InconsistentAlignment => "inconsistent_alignment",
            IssueCategory::InconsistentSpacing => "inconsistent_spacing",
            IssueCategory::InconsistentIndent => "inconsistent_indent",
            IssueCategory::Margins => "margins",
            IssueCategory::Structure => "structure",
        };
        write!(f, "{s}")
    }
}

/// One detected formatting non-conformity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    pub recommendation: Option<String>,
    /// How many elements the issue touches; the meaning depends on the
    /// category (paragraphs for consistency rules, axes for margins,
    /// sections for structure).
    pub affected_count: usize,
}

/// External collaborator that contributes additional issues, such as an
/// AI-backed reviewer. A soft dependency: the pipeline logs a failure and
/// continues with rule-based issues only.
pub trait StructuralReviewer: Send + Sync {
    /// Review the vision and return issues to merge into the rule-based
    /// list. Returned issues carry a category, so the planner folds them
    /// into the same action precedence as local ones.
    fn review(&self, vision: &Vision, norm: &NormProfile) -> Result<Vec<Issue>>;
}

/// Run every rule against the vision's structural model.
pub fn detect_issues(vision: &Vision, norm: &NormProfile) -> Vec<Issue> {
    let structure = &vision.structure;
    let body: Vec<&Paragraph> = structure
        .paragraphs
        .iter()
        .filter(|p| !norm.vocabulary.is_heading(&p.style_name))
        .collect();

    let mut issues = Vec::new();
    font_consistency(&body, norm, &mut issues);
    alignment_consistency(&body, norm, &mut issues);
    spacing_consistency(&body, norm, &mut issues);
    indent_consistency(&body, norm, &mut issues);
    margin_conformity(structure, norm, &mut issues);
    canonical_sections(structure, norm, &mut issues);
    issues
}

/// Issue-count based compliance score, banded rather than continuous.
///
/// This is a separate metric from the validator's deviation-based visual
/// score; the two can disagree on the same document and are reported side
/// by side, never unified.
pub fn structural_compliance_score(issue_count: usize) -> u8 {
    match issue_count {
        0 => 100,
        1..=2 => 90,
        3..=5 => 75,
        6..=10 => 60,
        11..=15 => 45,
        _ => 30,
    }
}

/// More than two distinct (name, size) pairs across body runs is treated as
/// inconsistent; two variants are tolerated since quotes and emphasis often
/// carry a legitimate second font.
fn font_consistency(body: &[&Paragraph], norm: &NormProfile, issues: &mut Vec<Issue>) {
    let mut variants = BTreeSet::new();
    for paragraph in body {
        for run in &paragraph.runs {
            if let Some(name) = &run.font.name {
                let key = match run.font.size {
                    Some(size) => format!("{name} {size}pt"),
                    None => format!("{name} (size unset)"),
                };
                variants.insert(key);
            }
        }
    }

    if variants.len() > 2 {
        let list = variants.iter().cloned().collect::<Vec<_>>().join(", ");
        issues.push(Issue {
            category: IssueCategory::InconsistentFonts,
            severity: Severity::High,
            description: format!(
                "found {} distinct font variants in body text: {list}",
                variants.len()
            ),
            recommendation: Some(format!(
                "standardize body text to {} {}pt",
                norm.font_name, norm.font_size_pt
            )),
            affected_count: body.len(),
        });
    }
}

fn alignment_consistency(body: &[&Paragraph], norm: &NormProfile, issues: &mut Vec<Issue>) {
    let alignments: BTreeSet<String> = body.iter().map(|p| p.alignment.to_string()).collect();
    if alignments.len() > 1 {
        let list = alignments.iter().cloned().collect::<Vec<_>>().join(", ");
        issues.push(Issue {
            category: IssueCategory::InconsistentAlignment,
            severity: Severity::Medium,
            description: format!(
                "body paragraphs use {} different alignments: {list}",
                alignments.len()
            ),
            recommendation: Some(format!("set body alignment to {}", norm.alignment)),
            affected_count: body.len(),
        });
    }
}

/// Paragraphs without an explicit line spacing inherit it from their style,
/// so only explicit values participate in the consistency check.
fn spacing_consistency(body: &[&Paragraph], norm: &NormProfile, issues: &mut Vec<Issue>) {
    let spacings: BTreeSet<String> = body
        .iter()
        .filter_map(|p| p.spacing.line_spacing)
        .map(|v| format!("{v}"))
        .collect();

    if spacings.len() > 1 {
        let list = spacings.iter().cloned().collect::<Vec<_>>().join(", ");
        issues.push(Issue {
            category: IssueCategory::InconsistentSpacing,
            severity: Severity::High,
            description: format!(
                "body paragraphs use {} different line spacings: {list}",
                spacings.len()
            ),
            recommendation: Some(format!("set body line spacing to {}", norm.line_spacing)),
            affected_count: body.len(),
        });
    }
}

fn indent_consistency(body: &[&Paragraph], norm: &NormProfile, issues: &mut Vec<Issue>) {
    let with = body
        .iter()
        .filter(|p| p.indent.first_line.is_some_and(|v| v > 0.0))
        .count();
    let without = body.len() - with;

    if with > 0 && without > 0 {
        issues.push(Issue {
            category: IssueCategory::InconsistentIndent,
            severity: Severity::Medium,
            description: format!(
                "{without} body paragraphs without first-line indent, {with} with"
            ),
            recommendation: Some(format!(
                "apply a {}cm first-line indent to body paragraphs",
                norm.first_line_indent_cm
            )),
            affected_count: without,
        });
    }
}

/// All mismatched axes combine into one issue rather than one issue per
/// axis; the planner emits a single margin fix either way.
fn margin_conformity(structure: &StructuralDocument, norm: &NormProfile, issues: &mut Vec<Issue>) {
    let Some(section) = structure.sections.first() else {
        return;
    };

    let mut off_axes = Vec::new();
    for ((axis, actual), (_, expected)) in section
        .margins
        .axes()
        .into_iter()
        .zip(norm.margins_cm.axes())
    {
        if let Some(value) = actual {
            if (value - expected).abs() > norm.margin_tolerance_cm {
                off_axes.push(format!("{axis} {value}cm (expected {expected}cm)"));
            }
        }
    }

    if !off_axes.is_empty() {
        let targets = norm.margins_cm;
        issues.push(Issue {
            category: IssueCategory::Margins,
            severity: Severity::High,
            description: format!(
                "margins outside {} targets: {}",
                norm.name,
                off_axes.join(", ")
            ),
            recommendation: Some(format!(
                "set margins to top {}cm, bottom {}cm, left {}cm, right {}cm",
                targets.top, targets.bottom, targets.left, targets.right
            )),
            affected_count: off_axes.len(),
        });
    }
}

fn canonical_sections(structure: &StructuralDocument, norm: &NormProfile, issues: &mut Vec<Issue>) {
    let missing: Vec<&str> = norm
        .expected_sections
        .iter()
        .filter(|pattern| !structure.paragraphs.iter().any(|p| pattern.matches(&p.text)))
        .map(|pattern| pattern.name.as_str())
        .collect();

    if !missing.is_empty() {
        issues.push(Issue {
            category: IssueCategory::Structure,
            severity: Severity::Low,
            description: format!("expected sections not found: {}", missing.join(", ")),
            recommendation: Some(format!("add the sections {} expects", norm.name)),
            affected_count: missing.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Alignment, Indent, LineSpacingRule, Margins, Run, RunFont, Section, Spacing,
    };

    fn body_para(index: usize, text: &str, font: &str, size: f64) -> Paragraph {
        Paragraph {
            index,
            text: text.to_string(),
            style_name: "Normal".to_string(),
            effective_font: RunFont::default(),
            alignment: Alignment::Justify,
            spacing: Spacing {
                line_spacing: Some(1.5),
                rule: Some(LineSpacingRule::Auto),
                ..Default::default()
            },
            indent: Indent {
                first_line: Some(1.25),
                ..Default::default()
            },
            runs: vec![Run {
                text: text.to_string(),
                font: RunFont {
                    name: Some(font.to_string()),
                    size: Some(size),
                    color: None,
                },
                ..Default::default()
            }],
        }
    }

    fn doc_with(paragraphs: Vec<Paragraph>) -> StructuralDocument {
        StructuralDocument {
            metadata: Default::default(),
            sections: vec![Section {
                index: 0,
                margins: Margins {
                    top: Some(3.0),
                    bottom: Some(2.0),
                    left: Some(3.0),
                    right: Some(2.0),
                },
                page_size: None,
                orientation: Default::default(),
            }],
            paragraphs,
            styles: Default::default(),
            hierarchy: Vec::new(),
            statistics: Default::default(),
        }
    }

    fn vision_of(doc: StructuralDocument) -> Vision {
        super::super::merge::merge(doc, None, &NormProfile::abnt())
    }

    /// ABNT profile with the canonical-section check disabled, for tests
    /// that focus on a single consistency rule.
    fn rule_norm() -> NormProfile {
        let mut norm = NormProfile::abnt();
        norm.expected_sections.clear();
        norm
    }

    #[test]
    fn test_uniform_document_yields_no_issues() {
        let doc = doc_with(vec![
            body_para(0, "Introdução", "Arial", 12.0),
            body_para(1, "Metodologia e materiais", "Arial", 12.0),
            body_para(2, "Resultados", "Arial", 12.0),
        ]);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_two_font_variants_tolerated() {
        let doc = doc_with(vec![
            body_para(0, "One", "Arial", 12.0),
            body_para(1, "Two", "Times New Roman", 12.0),
        ]);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        assert!(!issues
            .iter()
            .any(|i| i.category == IssueCategory::InconsistentFonts));
    }

    #[test]
    fn test_three_font_variants_flagged() {
        let doc = doc_with(vec![
            body_para(0, "One", "Arial", 12.0),
            body_para(1, "Two", "Times New Roman", 12.0),
            body_para(2, "Three", "Times New Roman", 11.0),
        ]);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::InconsistentFonts)
            .unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.affected_count, 3);
        assert!(issue.description.contains("Arial 12pt"));
        assert!(issue.description.contains("Times New Roman 11pt"));
    }

    #[test]
    fn test_font_issue_counts_every_body_paragraph() {
        // Minority fonts still implicate the whole body, since the fix
        // rewrites every body paragraph.
        let doc = doc_with(vec![
            body_para(0, "a", "Arial", 12.0),
            body_para(1, "b", "Arial", 12.0),
            body_para(2, "c", "Arial", 12.0),
            body_para(3, "d", "Comic Sans MS", 11.0),
            body_para(4, "e", "Comic Sans MS", 14.0),
        ]);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::InconsistentFonts)
            .unwrap();
        assert_eq!(issue.affected_count, 5);
    }

    #[test]
    fn test_headings_exempt_from_consistency_rules() {
        let mut heading = body_para(0, "1 Introdução", "Calibri", 20.0);
        heading.style_name = "Heading 1".to_string();
        heading.alignment = Alignment::Center;
        heading.spacing.line_spacing = Some(2.0);

        let doc = doc_with(vec![
            heading,
            body_para(1, "One", "Arial", 12.0),
            body_para(2, "Two", "Arial", 12.0),
        ]);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_mixed_alignment_flagged() {
        let mut left = body_para(1, "Two", "Arial", 12.0);
        left.alignment = Alignment::Left;
        let doc = doc_with(vec![body_para(0, "One", "Arial", 12.0), left]);

        let issues = detect_issues(&vision_of(doc), &rule_norm());
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::InconsistentAlignment)
            .unwrap();
        assert_eq!(issue.severity, Severity::Medium);
        assert!(issue.description.contains("justify"));
        assert!(issue.description.contains("left"));
    }

    #[test]
    fn test_mixed_spacing_flagged() {
        let mut double = body_para(1, "Two", "Arial", 12.0);
        double.spacing.line_spacing = Some(2.0);
        let doc = doc_with(vec![body_para(0, "One", "Arial", 12.0), double]);

        let issues = detect_issues(&vision_of(doc), &rule_norm());
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::InconsistentSpacing)
            .unwrap();
        assert_eq!(issue.severity, Severity::High);
    }

    #[test]
    fn test_unset_spacing_does_not_count_as_variant() {
        let mut unset = body_para(1, "Two", "Arial", 12.0);
        unset.spacing.line_spacing = None;
        let doc = doc_with(vec![body_para(0, "One", "Arial", 12.0), unset]);

        let issues = detect_issues(&vision_of(doc), &rule_norm());
        assert!(!issues
            .iter()
            .any(|i| i.category == IssueCategory::InconsistentSpacing));
    }

    #[test]
    fn test_mixed_indent_flagged() {
        let mut no_indent = body_para(2, "Three", "Arial", 12.0);
        no_indent.indent.first_line = None;
        let mut zero_indent = body_para(3, "Four", "Arial", 12.0);
        zero_indent.indent.first_line = Some(0.0);

        let doc = doc_with(vec![
            body_para(0, "One", "Arial", 12.0),
            body_para(1, "Two", "Arial", 12.0),
            no_indent,
            zero_indent,
        ]);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::InconsistentIndent)
            .unwrap();
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.affected_count, 2);
        assert!(issue.description.contains("2 body paragraphs without"));
    }

    #[test]
    fn test_margin_deviation_within_tolerance() {
        let mut doc = doc_with(vec![body_para(0, "One", "Arial", 12.0)]);
        doc.sections[0].margins.top = Some(2.8);
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        assert!(!issues.iter().any(|i| i.category == IssueCategory::Margins));
    }

    #[test]
    fn test_margin_issue_combines_axes() {
        let mut doc = doc_with(vec![body_para(0, "One", "Arial", 12.0)]);
        doc.sections[0].margins.top = Some(2.0);
        doc.sections[0].margins.right = Some(3.0);

        let issues = detect_issues(&vision_of(doc), &rule_norm());
        let margin_issues: Vec<_> = issues
            .iter()
            .filter(|i| i.category == IssueCategory::Margins)
            .collect();
        assert_eq!(margin_issues.len(), 1);

        let issue = margin_issues[0];
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.affected_count, 2);
        assert!(issue.description.contains("top 2cm (expected 3cm)"));
        assert!(issue.description.contains("right 3cm (expected 2cm)"));
        assert!(!issue.description.contains("bottom"));
    }

    #[test]
    fn test_unset_margins_not_flagged_here() {
        // The quick check reports unset margins; the detector only compares
        // declared values. The planner still schedules a margin fix.
        let mut doc = doc_with(vec![body_para(0, "One", "Arial", 12.0)]);
        doc.sections[0].margins = Margins::default();
        let issues = detect_issues(&vision_of(doc), &rule_norm());
        assert!(!issues.iter().any(|i| i.category == IssueCategory::Margins));
    }

    #[test]
    fn test_missing_sections_reported() {
        let doc = doc_with(vec![body_para(0, "1 Introdução", "Arial", 12.0)]);
        let issues = detect_issues(&vision_of(doc), &NormProfile::abnt());
        let issue = issues
            .iter()
            .find(|i| i.category == IssueCategory::Structure)
            .unwrap();
        assert_eq!(issue.severity, Severity::Low);
        assert_eq!(issue.affected_count, 5);
        assert!(issue.description.contains("references"));
        assert!(!issue.description.contains("introduction"));
    }

    #[test]
    fn test_compliance_score_bands() {
        assert_eq!(structural_compliance_score(0), 100);
        assert_eq!(structural_compliance_score(1), 90);
        assert_eq!(structural_compliance_score(2), 90);
        assert_eq!(structural_compliance_score(5), 75);
        assert_eq!(structural_compliance_score(10), 60);
        assert_eq!(structural_compliance_score(15), 45);
        assert_eq!(structural_compliance_score(16), 30);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&IssueCategory::InconsistentFonts).unwrap(),
            "\"inconsistent_fonts\""
        );
    }
}
