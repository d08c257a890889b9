//! Structured decision records
//!
//! The agent logs what happened each step as data. Text rendering only
//! happens through `Display`, for reports and trace output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::StepCount;

/// One entry in a generation's decision log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionEvent {
    Reward { step: StepCount },
    Punishment { step: StepCount, streak: u32 },
    GaveUp { step: StepCount, threshold: u32, streak: u32 },
}

impl DecisionEvent {
    pub fn step(&self) -> StepCount {
        match self {
            Self::Reward { step } | Self::Punishment { step, .. } | Self::GaveUp { step, .. } => {
                *step
            }
        }
    }

    pub fn is_give_up(&self) -> bool {
        matches!(self, Self::GaveUp { .. })
    }
}

impl fmt::Display for DecisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reward { step } => write!(
                f,
                "Step {}: REWARD received. Resetting consecutive punishments.",
                step
            ),
            Self::Punishment { step, streak } => write!(
                f,
                "Step {}: PUNISHMENT received. Consecutive: {}.",
                step, streak
            ),
            Self::GaveUp { step, threshold, streak } => write!(
                f,
                "Step {}: DECISION: Give Up. Reason: Reached give_up_threshold ({}) with {} consecutive punishments.",
                step, threshold, streak
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_punishment() {
        let event = DecisionEvent::Punishment { step: 3, streak: 2 };
        assert_eq!(event.to_string(), "Step 3: PUNISHMENT received. Consecutive: 2.");
    }

    #[test]
    fn test_render_give_up() {
        let event = DecisionEvent::GaveUp { step: 5, threshold: 5, streak: 5 };
        assert!(event.to_string().contains("Give Up"));
        assert!(event.is_give_up());
        assert_eq!(event.step(), 5);
    }
}
