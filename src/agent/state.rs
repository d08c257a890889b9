//! Give-up decision state machine
//!
//! The state is the punishment streak measured against the threshold.
//! A reward clears the streak; a punishment extends it; once the streak
//! reaches the threshold the agent gives up.

use serde::{Deserialize, Serialize};

use crate::agent::events::DecisionEvent;
use crate::core::error::{GambitError, Result};
use crate::core::types::StepCount;

/// Outcome of the per-step continuation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    GiveUp(DecisionEvent),
}

/// What the agent lived through in one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub lifespan: StepCount,
    pub total_rewards: StepCount,
    pub total_punishments: StepCount,
    pub final_consecutive_punishments: u32,
    pub decision_log: Vec<DecisionEvent>,
}

/// Counters and threshold shared by both agent variants
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    give_up_threshold: u32,
    consecutive_punishments: u32,
    total_rewards: StepCount,
    total_punishments: StepCount,
    steps_lived: StepCount,
    decision_log: Vec<DecisionEvent>,
    record_log: bool,
}

impl AgentState {
    pub fn new(give_up_threshold: u32) -> Result<Self> {
        if give_up_threshold == 0 {
            return Err(GambitError::invalid("give_up_threshold must be positive"));
        }

        Ok(Self {
            give_up_threshold,
            consecutive_punishments: 0,
            total_rewards: 0,
            total_punishments: 0,
            steps_lived: 0,
            decision_log: Vec::new(),
            record_log: true,
        })
    }

    /// Disable the per-step log; counters are unaffected
    pub fn with_decision_log(mut self, enabled: bool) -> Self {
        self.record_log = enabled;
        self
    }

    pub fn give_up_threshold(&self) -> u32 {
        self.give_up_threshold
    }

    pub fn consecutive_punishments(&self) -> u32 {
        self.consecutive_punishments
    }

    pub fn total_rewards(&self) -> StepCount {
        self.total_rewards
    }

    pub fn total_punishments(&self) -> StepCount {
        self.total_punishments
    }

    pub fn steps_lived(&self) -> StepCount {
        self.steps_lived
    }

    pub fn decision_log(&self) -> &[DecisionEvent] {
        &self.decision_log
    }

    /// Only the learning rule moves the threshold, and never below 1
    pub(crate) fn set_threshold(&mut self, threshold: u32) {
        self.give_up_threshold = threshold.max(1);
    }

    /// Clear per-generation counters. The threshold is untouched.
    pub fn reset(&mut self) {
        self.consecutive_punishments = 0;
        self.total_rewards = 0;
        self.total_punishments = 0;
        self.steps_lived = 0;
        self.decision_log.clear();
    }

    /// Apply one environment outcome
    pub fn record_step(&mut self, is_reward: bool) -> DecisionEvent {
        self.steps_lived += 1;

        let event = if is_reward {
            self.total_rewards += 1;
            self.consecutive_punishments = 0;
            DecisionEvent::Reward { step: self.steps_lived }
        } else {
            self.total_punishments += 1;
            self.consecutive_punishments += 1;
            DecisionEvent::Punishment {
                step: self.steps_lived,
                streak: self.consecutive_punishments,
            }
        };

        self.log(event);
        event
    }

    /// Give up iff the streak has reached the threshold
    pub fn decide(&mut self) -> Decision {
        if self.consecutive_punishments >= self.give_up_threshold {
            let event = DecisionEvent::GaveUp {
                step: self.steps_lived,
                threshold: self.give_up_threshold,
                streak: self.consecutive_punishments,
            };
            self.log(event);
            Decision::GiveUp(event)
        } else {
            Decision::Continue
        }
    }

    pub fn decide_to_continue(&mut self) -> bool {
        matches!(self.decide(), Decision::Continue)
    }

    pub fn get_generation_summary(&self) -> GenerationSummary {
        GenerationSummary {
            lifespan: self.steps_lived,
            total_rewards: self.total_rewards,
            total_punishments: self.total_punishments,
            final_consecutive_punishments: self.consecutive_punishments,
            decision_log: self.decision_log.clone(),
        }
    }

    fn log(&mut self, event: DecisionEvent) {
        if self.record_log {
            self.decision_log.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threshold_rejected() {
        assert!(AgentState::new(0).is_err());
    }

    #[test]
    fn test_reward_clears_streak() {
        let mut state = AgentState::new(3).unwrap();
        state.record_step(false);
        state.record_step(false);
        assert_eq!(state.consecutive_punishments(), 2);

        let event = state.record_step(true);
        assert_eq!(event, DecisionEvent::Reward { step: 3 });
        assert_eq!(state.consecutive_punishments(), 0);
        assert_eq!(state.total_rewards(), 1);
        assert_eq!(state.total_punishments(), 2);
        assert_eq!(state.steps_lived(), 3);
    }

    #[test]
    fn test_gives_up_at_threshold() {
        let mut state = AgentState::new(2).unwrap();
        state.record_step(false);
        assert!(state.decide_to_continue());
        state.record_step(false);
        assert!(!state.decide_to_continue());

        let last = state.decision_log().last().unwrap();
        assert_eq!(*last, DecisionEvent::GaveUp { step: 2, threshold: 2, streak: 2 });
    }

    #[test]
    fn test_continue_is_not_logged() {
        let mut state = AgentState::new(5).unwrap();
        state.record_step(false);
        state.decide_to_continue();
        assert_eq!(state.decision_log().len(), 1);
    }

    #[test]
    fn test_reset_clears_counters_keeps_threshold() {
        let mut state = AgentState::new(4).unwrap();
        for _ in 0..4 {
            state.record_step(false);
        }
        state.decide_to_continue();
        state.reset();

        assert_eq!(state.steps_lived(), 0);
        assert_eq!(state.consecutive_punishments(), 0);
        assert_eq!(state.total_punishments(), 0);
        assert!(state.decision_log().is_empty());
        assert_eq!(state.give_up_threshold(), 4);
    }

    #[test]
    fn test_reset_twice_is_idempotent() {
        let mut state = AgentState::new(3).unwrap();
        state.record_step(true);
        state.record_step(false);
        state.reset();
        let first = state.clone();
        state.reset();
        assert_eq!(state, first);
    }

    #[test]
    fn test_disabled_log_keeps_counters() {
        let mut state = AgentState::new(1).unwrap().with_decision_log(false);
        state.record_step(false);
        assert!(matches!(state.decide(), Decision::GiveUp(_)));
        assert!(state.decision_log().is_empty());
        assert_eq!(state.get_generation_summary().lifespan, 1);
    }

    #[test]
    fn test_summary_snapshot() {
        let mut state = AgentState::new(10).unwrap();
        state.record_step(false);
        state.record_step(true);
        state.record_step(false);
        let summary = state.get_generation_summary();

        assert_eq!(summary.lifespan, 3);
        assert_eq!(summary.total_rewards, 1);
        assert_eq!(summary.total_punishments, 2);
        assert_eq!(summary.final_consecutive_punishments, 1);
        assert_eq!(summary.decision_log.len(), 3);
    }
}
