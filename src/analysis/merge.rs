//! Reconciliation of the structural and visual models into a [`Vision`].
//!
//! The merge is a pure function: neither input model holds a reference into
//! the other, and either extractor can be swapped without touching this
//! module. Span coordinates stay in points inside the visual model; the
//! point-to-centimeter conversion for margin measurement happens here.

use crate::model::{
    DocumentKind, ElementCounts, QuickCheck, StructuralDocument, Vision, VisionAnalysis,
    VisualLayout, VisualMargins,
};
use crate::norm::NormProfile;

/// Merge one structural model with an optional visual layout.
///
/// `visual` is `None` when rendering was unavailable; the resulting vision
/// is still usable for structure-only analysis. The caller is responsible
/// for attaching a degradation note.
pub fn merge(
    structure: StructuralDocument,
    visual: Option<VisualLayout>,
    norm: &NormProfile,
) -> Vision {
    let visual_margins = visual.as_ref().and_then(measure_visual_margins);
    let analysis = VisionAnalysis {
        total_elements: ElementCounts {
            paragraphs: structure.statistics.total_paragraphs,
            sections: structure.sections.len(),
            hierarchy_levels: structure.hierarchy_levels(),
            pages: visual.as_ref().map(|v| v.total_pages),
        },
        document_kind: DocumentKind::from_word_count(structure.statistics.total_words),
        quick_check: quick_check(&structure, norm),
    };

    Vision {
        structure,
        visual,
        visual_margins,
        analysis,
        note: None,
    }
}

/// Measure page margins from page-1 span coordinates.
///
/// `left = min(x0)`, `top = min(y0)`, `right = page_width - max(x1)`, each
/// converted from points to centimeters and rounded to 2 decimals. Returns
/// `None` when the layout has no pages or the first page carries no text
/// spans, since there is nothing to measure against.
pub fn measure_visual_margins(visual: &VisualLayout) -> Option<VisualMargins> {
    let page = visual.first_page()?;
    if page.spans.is_empty() {
        return None;
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    for span in &page.spans {
        min_x = min_x.min(span.bbox.x0);
        min_y = min_y.min(span.bbox.y0);
        max_x = max_x.max(span.bbox.x1);
    }

    Some(VisualMargins {
        top: round2(pt_to_cm(min_y)),
        left: round2(pt_to_cm(min_x)),
        right: round2(pt_to_cm(page.width - max_x)),
    })
}

/// Coarse pre-flight compliance signal against the norm's headline targets.
///
/// Margins are compared exactly and fonts/sizes against the dominant
/// histogram entry only. The full issue detector applies tolerances and
/// per-paragraph rules; this check exists so callers get an immediate
/// verdict before any of that runs.
fn quick_check(structure: &StructuralDocument, norm: &NormProfile) -> QuickCheck {
    let mut issues = Vec::new();

    if let Some(section) = structure.sections.first() {
        for ((axis, actual), (_, expected)) in
            section.margins.axes().into_iter().zip(norm.margins_cm.axes())
        {
            match actual {
                Some(value) if value != expected => {
                    issues.push(format!("{axis} margin {value}cm (expected {expected}cm)"));
                }
                None => {
                    issues.push(format!("{axis} margin not set (expected {expected}cm)"));
                }
                _ => {}
            }
        }
    }

    if let Some(font) = structure.statistics.dominant_font() {
        if !norm.accepts_font(font) {
            issues.push(format!(
                "dominant font {font} (expected {})",
                norm.font_name
            ));
        }
    }

    if let Some(size) = structure.statistics.dominant_size() {
        if size != norm.font_size_pt {
            issues.push(format!(
                "dominant size {size}pt (expected {}pt)",
                norm.font_size_pt
            ));
        }
    }

    QuickCheck {
        compliant: issues.is_empty(),
        total_issues: issues.len(),
        issues,
    }
}

fn pt_to_cm(pt: f32) -> f64 {
    f64::from(pt) / 72.0 * 2.54
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
