//! Deterministic compilation of detected issues into an ordered action plan.
//!
//! Priority follows a fixed precedence (margins, fonts, spacing, alignment,
//! indent) independent of issue discovery order, and at most one action per
//! category is ever emitted. Action parameters always carry the norm's
//! target values, never the offending values an issue reported.

use crate::analysis::{Issue, IssueCategory};
use crate::model::StructuralDocument;
use crate::norm::NormProfile;

use super::action::{
    Action, ActionOp, AlignmentParams, FontParams, IndentParams, SpacingParams, Target,
};

/// Compile a prioritized action plan.
pub fn plan_actions(
    issues: &[Issue],
    structure: &StructuralDocument,
    norm: &NormProfile,
) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut priority = 1u32;
    let has = |category: IssueCategory| issues.iter().any(|i| i.category == category);

    if needs_margin_fix(structure, norm) {
        actions.push(Action {
            priority,
            target: Target::Section(0),
            op: ActionOp::FixMargin(norm.margins_cm.into()),
            description: format!("set page margins to the {} targets", norm.name),
        });
        priority += 1;
    }

    if has(IssueCategory::InconsistentFonts) {
        actions.push(Action {
            priority,
            target: Target::AllBody,
            op: ActionOp::FixFont(FontParams {
                name: norm.font_name.clone(),
                size: norm.font_size_pt,
            }),
            description: format!(
                "standardize body font to {} {}pt",
                norm.font_name, norm.font_size_pt
            ),
        });
        priority += 1;
    }

    if has(IssueCategory::InconsistentSpacing) {
        actions.push(Action {
            priority,
            target: Target::AllBody,
            op: ActionOp::FixSpacing(SpacingParams {
                line_spacing: norm.line_spacing,
            }),
            description: format!("set body line spacing to {}", norm.line_spacing),
        });
        priority += 1;
    }

    if has(IssueCategory::InconsistentAlignment) {
        actions.push(Action {
            priority,
            target: Target::AllBody,
            op: ActionOp::FixAlignment(AlignmentParams {
                alignment: norm.alignment,
            }),
            description: format!("set body alignment to {}", norm.alignment),
        });
        priority += 1;
    }

    if has(IssueCategory::InconsistentIndent) {
        actions.push(Action {
            priority,
            target: Target::AllBody,
            op: ActionOp::FixIndent(IndentParams {
                first_line: norm.first_line_indent_cm,
            }),
            description: format!(
                "apply a {}cm first-line indent to body paragraphs",
                norm.first_line_indent_cm
            ),
        });
    }

    actions
}

/// The margin fix is re-derived from the structure rather than from a
/// margins issue: an unset axis never reaches the issue list but still
/// needs fixing, and near-target margins get normalized to the exact
/// values. No section, no fix.
fn needs_margin_fix(structure: &StructuralDocument, norm: &NormProfile) -> bool {
    let Some(section) = structure.sections.first() else {
        return false;
    };
    section
        .margins
        .axes()
        .into_iter()
        .zip(norm.margins_cm.axes())
        .any(|((_, actual), (_, expected))| actual != Some(expected))
}
