//! Scroll narrative: step rules, step detection and the coordinator driving the layout.

mod coordinator;
mod detector;
mod rotation;
mod steps;

pub use coordinator::{Facing, ScrollCoordinator, ScrollState, Transition};
pub use detector::{DEFAULT_OFFSET, StepDetector};
pub use rotation::{RotationAnimator, RotationHandle, RotationOutcome, ease_out_cubic};
pub use steps::{
	Direction, HighlightClass, ScrollStep, StepRule, StepTarget, default_narrative, lookup,
};
