//! Measurement-only validation of a rendered document against a norm.
//!
//! The validator is a black box: it scores whatever render it is given and
//! knows nothing about which actions were executed, so it can equally
//! validate a document it never modified. Four categories (margins, fonts,
//! spacing, alignment) are measured on the page geometry and averaged into
//! an overall score. Degenerate inputs (no spans, no line pairs) yield
//! explicit zero scores with an "insufficient data" reason, never errors.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::Severity;
use crate::error::Result;
use crate::model::{DocStatistics, VisualLayout};
use crate::norm::{MarginTargets, NormProfile};
use crate::pdf;
use crate::pdf::layout::{group_into_blocks, group_into_lines};

const INSUFFICIENT_DATA: &str = "insufficient data";

/// Which measurement a validation issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationCategory {
    Margins,
    Fonts,
    Spacing,
    Alignment,
}

impl std::fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidationCategory::Margins => "margins",
            ValidationCategory::Fonts => "fonts",
            ValidationCategory::Spacing => "spacing",
            ValidationCategory::Alignment => "alignment",
        };
        write!(f, "{s}")
    }
}

/// One flattened validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub category: ValidationCategory,
    pub severity: Severity,
    pub description: String,
    /// How many points the category lost, `100 - category score`
    pub score_impact: f64,
}

/// Margins measured from page-1 block geometry, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredMargins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Margin measurement result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginCheck {
    pub valid: bool,
    pub score: f64,
    pub measured: Option<MeasuredMargins>,
    pub expected: MarginTargets,
    pub tolerance_cm: f64,
    pub issues: Vec<String>,
    pub reason: Option<String>,
}

impl MarginCheck {
    fn insufficient(expected: MarginTargets, tolerance_cm: f64) -> Self {
        Self {
            valid: false,
            score: 0.0,
            measured: None,
            expected,
            tolerance_cm,
            issues: Vec::new(),
            reason: Some(INSUFFICIENT_DATA.to_string()),
        }
    }
}

/// Font histogram result over the first three pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontCheck {
    pub valid: bool,
    pub score: f64,
    pub main_font: Option<String>,
    pub main_size: Option<f64>,
    pub issues: Vec<String>,
    pub reason: Option<String>,
}

impl FontCheck {
    fn insufficient() -> Self {
        Self {
            valid: false,
            score: 0.0,
            main_font: None,
            main_size: None,
            issues: Vec::new(),
            reason: Some(INSUFFICIENT_DATA.to_string()),
        }
    }
}

/// Line-gap ratio measurement result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingCheck {
    pub valid: bool,
    pub score: f64,
    pub mean_ratio: Option<f64>,
    pub median_ratio: Option<f64>,
    pub expected_ratio: f64,
    pub sample_size: usize,
    pub issues: Vec<String>,
    pub reason: Option<String>,
}

impl SpacingCheck {
    fn insufficient(expected_ratio: f64) -> Self {
        Self {
            valid: false,
            score: 0.0,
            mean_ratio: None,
            median_ratio: None,
            expected_ratio,
            sample_size: 0,
            issues: Vec::new(),
            reason: Some(INSUFFICIENT_DATA.to_string()),
        }
    }
}

/// Edge-deviation measurement result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentCheck {
    pub valid: bool,
    pub score: f64,
    pub left_edge_std: Option<f64>,
    pub right_edge_std: Option<f64>,
    pub issues: Vec<String>,
    pub reason: Option<String>,
}

impl AlignmentCheck {
    fn insufficient() -> Self {
        Self {
            valid: false,
            score: 0.0,
            left_edge_std: None,
            right_edge_std: None,
            issues: Vec::new(),
            reason: Some(INSUFFICIENT_DATA.to_string()),
        }
    }
}

/// The full validation verdict for one render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub margins: MarginCheck,
    pub fonts: FontCheck,
    pub spacing: SpacingCheck,
    pub alignment: AlignmentCheck,
    pub overall_score: f64,
    pub overall_valid: bool,
    pub total_issues: usize,
    pub all_issues: Vec<ValidationIssue>,
}

/// Validate a rendered PDF at `path` against the norm's targets.
pub fn validate_pdf<P: AsRef<Path>>(path: P, norm: &NormProfile) -> Result<ValidationResult> {
    let path = path.as_ref();
    debug!("validating render at {}", path.display());
    let layout = pdf::read_layout(path)?;
    Ok(validate_layout(&layout, norm))
}

/// Validate an already-extracted visual layout.
pub fn validate_layout(layout: &VisualLayout, norm: &NormProfile) -> ValidationResult {
    let margins = check_margins(layout, norm);
    let fonts = check_fonts(layout, norm);
    let spacing = check_spacing(layout, norm);
    let alignment = check_alignment(layout, norm);

    let overall_score =
        round1((margins.score + fonts.score + spacing.score + alignment.score) / 4.0);

    let mut all_issues = Vec::new();
    collect_issues(&mut all_issues, ValidationCategory::Margins, &margins.issues, margins.score);
    collect_issues(&mut all_issues, ValidationCategory::Fonts, &fonts.issues, fonts.score);
    collect_issues(&mut all_issues, ValidationCategory::Spacing, &spacing.issues, spacing.score);
    collect_issues(
        &mut all_issues,
        ValidationCategory::Alignment,
        &alignment.issues,
        alignment.score,
    );

    ValidationResult {
        margins,
        fonts,
        spacing,
        alignment,
        overall_score,
        overall_valid: overall_score >= norm.pass_score,
        total_issues: all_issues.len(),
        all_issues,
    }
}

fn collect_issues(
    out: &mut Vec<ValidationIssue>,
    category: ValidationCategory,
    issues: &[String],
    score: f64,
) {
    for description in issues {
        out.push(ValidationIssue {
            category,
            severity: severity_for(score),
            description: description.clone(),
            score_impact: round1(100.0 - score),
        });
    }
}

/// Severity derives from how many points the category lost.
fn severity_for(score: f64) -> Severity {
    if score < 50.0 {
        Severity::High
    } else if score < 80.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Page-1 block geometry vs the norm's margin targets. The average absolute
/// deviation over all four axes drives the score at 30 points per cm.
fn check_margins(layout: &VisualLayout, norm: &NormProfile) -> MarginCheck {
    let expected = norm.margins_cm;
    let tolerance = norm.margin_tolerance_cm;

    let Some(page) = layout.first_page() else {
        return MarginCheck::insufficient(expected, tolerance);
    };
    let blocks = group_into_blocks(group_into_lines(&page.spans));
    if blocks.is_empty() {
        return MarginCheck::insufficient(expected, tolerance);
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for block in &blocks {
        min_x = min_x.min(block.bbox.x0);
        min_y = min_y.min(block.bbox.y0);
        max_x = max_x.max(block.bbox.x1);
        max_y = max_y.max(block.bbox.y1);
    }

    let measured = MeasuredMargins {
        top: round2(pt_to_cm(min_y)),
        bottom: round2(pt_to_cm(page.height - max_y)),
        left: round2(pt_to_cm(min_x)),
        right: round2(pt_to_cm(page.width - max_x)),
    };

    let axes = [
        ("top", measured.top, expected.top),
        ("bottom", measured.bottom, expected.bottom),
        ("left", measured.left, expected.left),
        ("right", measured.right, expected.right),
    ];

    let mut issues = Vec::new();
    let mut deviation_sum = 0.0;
    for (axis, value, target) in axes {
        let deviation = (value - target).abs();
        deviation_sum += deviation;
        if deviation > tolerance {
            issues.push(format!("{axis} margin {value}cm (expected {target}cm)"));
        }
    }

    MarginCheck {
        valid: issues.is_empty(),
        score: round1((100.0 - deviation_sum / 4.0 * 30.0).max(0.0)),
        measured: Some(measured),
        expected,
        tolerance_cm: tolerance,
        issues,
        reason: None,
    }
}

/// Span histograms over the first three pages. Half the score comes from an
/// accepted family being present at all, half from the dominant size.
fn check_fonts(layout: &VisualLayout, norm: &NormProfile) -> FontCheck {
    let mut fonts: BTreeMap<String, usize> = BTreeMap::new();
    let mut sizes: BTreeMap<String, usize> = BTreeMap::new();

    for page in layout.pages.iter().take(3) {
        for span in &page.spans {
            *fonts.entry(span.font_name.clone()).or_insert(0) += 1;
            *sizes
                .entry(DocStatistics::size_key(f64::from(span.font_size)))
                .or_insert(0) += 1;
        }
    }

    let Some(main_font) = dominant(&fonts).cloned() else {
        return FontCheck::insufficient();
    };
    let main_size = dominant(&sizes)
        .and_then(|k| k.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_correct_font = fonts.keys().any(|name| norm.accepts_font(name));
    let size_delta = (main_size - norm.font_size_pt).abs();
    let has_correct_size = size_delta <= norm.size_tolerance_pt;

    let font_score = if has_correct_font { 50.0 } else { 0.0 };
    let size_score = if has_correct_size {
        50.0
    } else {
        (50.0 - size_delta * 5.0).max(0.0)
    };

    let mut issues = Vec::new();
    if !has_correct_font {
        issues.push(format!(
            "main font {main_font} not in accepted families ({})",
            norm.accepted_fonts.join(", ")
        ));
    }
    if !has_correct_size {
        issues.push(format!(
            "main size {main_size}pt (expected {}pt)",
            norm.font_size_pt
        ));
    }

    FontCheck {
        valid: has_correct_font && has_correct_size,
        score: round1(font_score + size_score),
        main_font: Some(main_font),
        main_size: Some(main_size),
        issues,
        reason: None,
    }
}

/// Gap-to-height ratio of consecutive line pairs within each page-1 block.
fn check_spacing(layout: &VisualLayout, norm: &NormProfile) -> SpacingCheck {
    let expected = norm.expected_spacing_ratio();
    let Some(page) = layout.first_page() else {
        return SpacingCheck::insufficient(expected);
    };

    let blocks = group_into_blocks(group_into_lines(&page.spans));
    let mut ratios = Vec::new();
    for block in &blocks {
        for pair in block.lines.windows(2) {
            let height = f64::from(pair[0].bbox.height());
            if height > 0.0 {
                let gap = f64::from(pair[1].bbox.y0 - pair[0].bbox.y1);
                ratios.push(gap / height);
            }
        }
    }

    if ratios.is_empty() {
        return SpacingCheck::insufficient(expected);
    }

    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let deviation = (mean - expected).abs();
    let valid = deviation <= norm.spacing_ratio_tolerance;

    let issues = if valid {
        Vec::new()
    } else {
        vec![format!(
            "mean line-gap ratio {} (expected about {expected})",
            round2(mean)
        )]
    };

    SpacingCheck {
        valid,
        score: round1((100.0 - deviation * 150.0).max(0.0)),
        mean_ratio: Some(round3(mean)),
        median_ratio: Some(round3(median(&mut ratios))),
        expected_ratio: expected,
        sample_size: ratios.len(),
        issues,
        reason: None,
    }
}

/// Sample standard deviation of page-1 line edges. Consistent edges on both
/// sides read as justified text.
fn check_alignment(layout: &VisualLayout, norm: &NormProfile) -> AlignmentCheck {
    let limit = norm.edge_deviation_limit_pt;
    let Some(page) = layout.first_page() else {
        return AlignmentCheck::insufficient();
    };

    let lines = group_into_lines(&page.spans);
    if lines.is_empty() {
        return AlignmentCheck::insufficient();
    }

    let left_edges: Vec<f64> = lines.iter().map(|l| f64::from(l.bbox.x0)).collect();
    let right_edges: Vec<f64> = lines
        .iter()
        .map(|l| f64::from(page.width - l.bbox.x1))
        .collect();

    let left_std = sample_stdev(&left_edges);
    let right_std = sample_stdev(&right_edges);

    let mut score = 100.0;
    if left_std > limit {
        score -= ((left_std - limit) * 2.0).min(40.0);
    }
    if right_std > limit {
        score -= ((right_std - limit) * 2.0).min(40.0);
    }

    let mut issues = Vec::new();
    if left_std >= limit {
        issues.push(format!(
            "inconsistent left edge (deviation {}pt)",
            round2(left_std)
        ));
    }
    if right_std >= limit {
        issues.push(format!(
            "inconsistent right edge (deviation {}pt)",
            round2(right_std)
        ));
    }

    AlignmentCheck {
        valid: left_std < limit && right_std < limit,
        score: round1(score.max(0.0)),
        left_edge_std: Some(round2(left_std)),
        right_edge_std: Some(round2(right_std)),
        issues,
        reason: None,
    }
}

/// Key with the highest count, ties to the lexicographically smallest.
fn dominant(map: &BTreeMap<String, usize>) -> Option<&String> {
    let mut best: Option<(&String, usize)> = None;
    for (key, &count) in map {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(k, _)| k)
}

/// Sample standard deviation; 0.0 for fewer than two values.
fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn pt_to_cm(pt: f32) -> f64 {
    f64::from(pt) / 72.0 * 2.54
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
