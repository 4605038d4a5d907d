//! Ordered execution of an action plan against the structural model.
//!
//! Actions run in priority order. Each one is applied independently: a
//! failed target resolution becomes an error outcome and execution moves on
//! to the next action, so one bad selector never aborts the plan. Every
//! operation sets properties to absolute values and never touches text
//! content, which makes the whole plan safe to replay.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{LineSpacingRule, Margins, StructuralDocument};
use crate::norm::StyleVocabulary;

use super::action::{Action, ActionOp, Target};

/// Outcome status of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Error,
}

/// Per-action execution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Position in execution order
    pub action_index: usize,
    pub action: String,
    pub target: String,
    pub priority: u32,
    pub status: ActionStatus,
    pub message: String,
}

/// Aggregate result of executing an action plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub total_actions: usize,
    pub successful_actions: usize,
    pub failed_actions: usize,
    /// Percentage of actions that succeeded; 0.0 for an empty plan.
    pub success_rate: f64,
    pub outcomes: Vec<ActionOutcome>,
}

/// Execute a plan against the model, in priority order.
///
/// The sort is stable, so actions sharing a priority keep their planner
/// order. The vocabulary decides which paragraphs `all_body` selects.
pub fn execute(
    structure: &mut StructuralDocument,
    actions: &[Action],
    vocabulary: &StyleVocabulary,
) -> ExecutionResult {
    let mut ordered: Vec<&Action> = actions.iter().collect();
    ordered.sort_by_key(|a| a.priority);

    let mut outcomes = Vec::with_capacity(ordered.len());
    let mut successful = 0usize;

    for (action_index, action) in ordered.into_iter().enumerate() {
        let (status, message) = match apply(structure, action, vocabulary) {
            Ok(message) => {
                debug!("{} on {}: {message}", action.op.name(), action.target);
                successful += 1;
                (ActionStatus::Success, message)
            }
            Err(err) => {
                warn!("{} on {} failed: {err}", action.op.name(), action.target);
                (ActionStatus::Error, err.to_string())
            }
        };
        outcomes.push(ActionOutcome {
            action_index,
            action: action.op.name().to_string(),
            target: action.target.to_string(),
            priority: action.priority,
            status,
            message,
        });
    }

    let total = outcomes.len();
    ExecutionResult {
        total_actions: total,
        successful_actions: successful,
        failed_actions: total - successful,
        success_rate: if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64 * 100.0
        },
        outcomes,
    }
}

fn apply(
    structure: &mut StructuralDocument,
    action: &Action,
    vocabulary: &StyleVocabulary,
) -> Result<String> {
    match &action.op {
        ActionOp::FixMargin(params) => {
            let sections = resolve_sections(structure, action.target)?;
            let margins = Margins {
                top: Some(params.top),
                bottom: Some(params.bottom),
                left: Some(params.left),
                right: Some(params.right),
            };
            for &index in &sections {
                structure.sections[index].margins = margins;
            }
            Ok(format!(
                "margins set to {}/{}/{}/{}cm on {} section(s)",
                params.top,
                params.bottom,
                params.left,
                params.right,
                sections.len()
            ))
        }
        ActionOp::FixFont(params) => {
            let indices = resolve_paragraphs(structure, action.target, vocabulary, false)?;
            for &index in &indices {
                for run in &mut structure.paragraphs[index].runs {
                    run.font.name = Some(params.name.clone());
                    run.font.size = Some(params.size);
                }
            }
            Ok(format!(
                "font set to {} {}pt on {} paragraph(s)",
                params.name,
                params.size,
                indices.len()
            ))
        }
        ActionOp::FixSpacing(params) => {
            let indices = resolve_paragraphs(structure, action.target, vocabulary, false)?;
            for &index in &indices {
                let spacing = &mut structure.paragraphs[index].spacing;
                spacing.line_spacing = Some(params.line_spacing);
                spacing.rule = Some(LineSpacingRule::Auto);
            }
            Ok(format!(
                "line spacing set to {} on {} paragraph(s)",
                params.line_spacing,
                indices.len()
            ))
        }
        ActionOp::FixAlignment(params) => {
            let indices = resolve_paragraphs(structure, action.target, vocabulary, false)?;
            for &index in &indices {
                structure.paragraphs[index].alignment = params.alignment;
            }
            Ok(format!(
                "alignment set to {} on {} paragraph(s)",
                params.alignment,
                indices.len()
            ))
        }
        ActionOp::FixIndent(params) => {
            let indices = resolve_paragraphs(structure, action.target, vocabulary, true)?;
            for &index in &indices {
                structure.paragraphs[index].indent.first_line = Some(params.first_line);
            }
            Ok(format!(
                "first-line indent set to {}cm on {} paragraph(s)",
                params.first_line,
                indices.len()
            ))
        }
    }
}

/// Margin fixes take section-shaped targets only.
fn resolve_sections(structure: &StructuralDocument, target: Target) -> Result<Vec<usize>> {
    match target {
        Target::Section(index) => {
            if index >= structure.sections.len() {
                return Err(Error::TargetResolution(format!(
                    "section {index} does not exist"
                )));
            }
            Ok(vec![index])
        }
        Target::AllSections => Ok((0..structure.sections.len()).collect()),
        Target::Paragraph(_) | Target::AllBody | Target::All => Err(Error::TargetResolution(
            format!("margin fix cannot target {target}"),
        )),
    }
}

/// `skip_empty` additionally drops paragraphs with no visible text; indent
/// fixes use it so separator paragraphs stay untouched.
fn resolve_paragraphs(
    structure: &StructuralDocument,
    target: Target,
    vocabulary: &StyleVocabulary,
    skip_empty: bool,
) -> Result<Vec<usize>> {
    let paragraphs = &structure.paragraphs;
    match target {
        Target::Paragraph(index) => {
            if index >= paragraphs.len() {
                return Err(Error::TargetResolution(format!(
                    "paragraph {index} does not exist"
                )));
            }
            Ok(vec![index])
        }
        Target::AllBody => Ok(paragraphs
            .iter()
            .filter(|p| !vocabulary.is_heading(&p.style_name))
            .filter(|p| !skip_empty || !p.is_empty())
            .map(|p| p.index)
            .collect()),
        Target::All => Ok(paragraphs
            .iter()
            .filter(|p| !skip_empty || !p.is_empty())
            .map(|p| p.index)
            .collect()),
        Target::Section(_) | Target::AllSections => Err(Error::TargetResolution(format!(
            "paragraph fix cannot target {target}"
        ))),
    }
}
