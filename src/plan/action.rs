//! Typed formatting actions.
//!
//! Each operation carries one concrete parameter record instead of a loose
//! key/value bag, so the executor's dispatch is exhaustive and a mistyped
//! parameter is a compile error rather than a silent no-op. The serialized
//! form keeps the wire names (`action`, `params`, `target` selector
//! strings) stable for external consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::Alignment;
use crate::norm::MarginTargets;

/// Where an action applies, serialized as a selector string
/// (`section_0`, `paragraph_12`, `all_body`, `all`, `all_sections`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Target {
    /// One section by index
    Section(usize),
    /// One paragraph by index
    Paragraph(usize),
    /// Every paragraph not styled as a heading
    AllBody,
    /// Every paragraph
    All,
    /// Every section
    AllSections,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Section(i) => write!(f, "section_{i}"),
            Target::Paragraph(i) => write!(f, "paragraph_{i}"),
            Target::AllBody => write!(f, "all_body"),
            Target::All => write!(f, "all"),
            Target::AllSections => write!(f, "all_sections"),
        }
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.to_string()
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_body" => return Ok(Target::AllBody),
            "all" => return Ok(Target::All),
            "all_sections" => return Ok(Target::AllSections),
            _ => {}
        }
        if let Some(index) = s.strip_prefix("section_") {
            return index
                .parse()
                .map(Target::Section)
                .map_err(|_| Error::TargetResolution(format!("invalid target: {s}")));
        }
        if let Some(index) = s.strip_prefix("paragraph_") {
            return index
                .parse()
                .map(Target::Paragraph)
                .map_err(|_| Error::TargetResolution(format!("invalid target: {s}")));
        }
        Err(Error::TargetResolution(format!("invalid target: {s}")))
    }
}

impl TryFrom<String> for Target {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Page margin targets in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginParams {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl From<MarginTargets> for MarginParams {
    fn from(t: MarginTargets) -> Self {
        Self {
            top: t.top,
            bottom: t.bottom,
            left: t.left,
            right: t.right,
        }
    }
}

/// Font family and size in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontParams {
    pub name: String,
    pub size: f64,
}

/// Line spacing as a multiple of single spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingParams {
    pub line_spacing: f64,
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentParams {
    pub alignment: Alignment,
}

/// First-line indent in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndentParams {
    pub first_line: f64,
}

/// The operation an action performs, with its typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
pub enum ActionOp {
    FixMargin(MarginParams),
    FixFont(FontParams),
    FixSpacing(SpacingParams),
    FixAlignment(AlignmentParams),
    FixIndent(IndentParams),
}

impl ActionOp {
    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            ActionOp::FixMargin(_) => "fix_margin",
            ActionOp::FixFont(_) => "fix_font",
            ActionOp::FixSpacing(_) => "fix_spacing",
            ActionOp::FixAlignment(_) => "fix_alignment",
            ActionOp::FixIndent(_) => "fix_indent",
        }
    }
}

/// One idempotent formatting fix with a resolved target and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub priority: u32,
    pub target: Target,
    #[serde(flatten)]
    pub op: ActionOp,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trip() {
        for target in [
            Target::Section(0),
            Target::Paragraph(12),
            Target::AllBody,
            Target::All,
            Target::AllSections,
        ] {
            let s = target.to_string();
            assert_eq!(s.parse::<Target>().unwrap(), target, "selector {s}");
        }
    }

    #[test]
    fn test_target_rejects_malformed_selectors() {
        assert!("paragraph_x".parse::<Target>().is_err());
        assert!("sections_1".parse::<Target>().is_err());
        assert!("".parse::<Target>().is_err());
        assert!("section_".parse::<Target>().is_err());
    }

    #[test]
    fn test_action_wire_shape() {
        let action = Action {
            priority: 2,
            target: Target::AllBody,
            op: ActionOp::FixFont(FontParams {
                name: "Arial".to_string(),
                size: 12.0,
            }),
            description: "standardize body font".to_string(),
        };

        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], "fix_font");
        assert_eq!(value["target"], "all_body");
        assert_eq!(value["params"]["name"], "Arial");
        assert_eq!(value["params"]["size"], 12.0);
        assert_eq!(value["priority"], 2);
    }

    #[test]
    fn test_action_deserializes_from_wire_shape() {
        let json = r#"{
            "priority": 1,
            "target": "section_0",
            "action": "fix_margin",
            "params": {"top": 3.0, "bottom": 2.0, "left": 3.0, "right": 2.0},
            "description": "set margins"
        }"#;

        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(action.target, Target::Section(0));
        assert_eq!(
            action.op,
            ActionOp::FixMargin(MarginParams {
                top: 3.0,
                bottom: 2.0,
                left: 3.0,
                right: 2.0,
            })
        );
    }
}
