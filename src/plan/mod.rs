//! Action planning and execution: issues in, an ordered plan of typed
//! formatting fixes out, applied against the structural model.

mod action;
mod executor;
mod planner;

pub use action::{
    Action, ActionOp, AlignmentParams, FontParams, IndentParams, MarginParams, SpacingParams,
    Target,
};
pub use executor::{execute, ActionOutcome, ActionStatus, ExecutionResult};
pub use planner::plan_actions;
