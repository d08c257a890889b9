//! Agents that endure punishment until they give up
//!
//! Both variants share [`AgentState`]. The learning variant also owns a
//! [`LearningRule`] that moves the threshold between generations; its
//! `reset` keeps both the threshold and the history.

pub mod events;
pub mod learning;
pub mod state;

pub use events::DecisionEvent;
pub use learning::{LearningRule, LearningUpdate};
pub use state::{AgentState, Decision, GenerationSummary};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{AgentKind, StepCount};

#[derive(Debug, Clone, PartialEq)]
pub enum Agent {
    Fixed(AgentState),
    Learning { state: AgentState, rule: LearningRule },
}

impl Agent {
    pub fn fixed(give_up_threshold: u32) -> Result<Self> {
        Ok(Self::Fixed(AgentState::new(give_up_threshold)?))
    }

    pub fn learning(initial_threshold: u32, learning_rate: f64) -> Result<Self> {
        let state = AgentState::new(initial_threshold)?;
        let rule = LearningRule::new(initial_threshold, learning_rate)?;
        Ok(Self::Learning { state, rule })
    }

    /// Build the variant named by the config
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let agent = match config.agent_type {
            AgentKind::Fixed => Self::fixed(config.agent_initial_threshold)?,
            AgentKind::Learning => {
                Self::learning(config.agent_initial_threshold, config.learning_rate)?
            }
        };
        Ok(agent.with_decision_log(config.record_decision_log))
    }

    pub fn with_decision_log(self, enabled: bool) -> Self {
        match self {
            Self::Fixed(state) => Self::Fixed(state.with_decision_log(enabled)),
            Self::Learning { state, rule } => Self::Learning {
                state: state.with_decision_log(enabled),
                rule,
            },
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Fixed(_) => AgentKind::Fixed,
            Self::Learning { .. } => AgentKind::Learning,
        }
    }

    pub fn is_learning(&self) -> bool {
        matches!(self, Self::Learning { .. })
    }

    pub fn state(&self) -> &AgentState {
        match self {
            Self::Fixed(state) | Self::Learning { state, .. } => state,
        }
    }

    fn state_mut(&mut self) -> &mut AgentState {
        match self {
            Self::Fixed(state) | Self::Learning { state, .. } => state,
        }
    }

    pub fn give_up_threshold(&self) -> u32 {
        self.state().give_up_threshold()
    }

    pub fn learning_rule(&self) -> Option<&LearningRule> {
        match self {
            Self::Fixed(_) => None,
            Self::Learning { rule, .. } => Some(rule),
        }
    }

    /// Start a new generation
    ///
    /// Per-generation counters are cleared for both variants. Neither
    /// variant touches the threshold here, and the learning history stays.
    pub fn reset(&mut self) {
        self.state_mut().reset();
    }

    pub fn record_step(&mut self, is_reward: bool) -> DecisionEvent {
        self.state_mut().record_step(is_reward)
    }

    pub fn decide(&mut self) -> Decision {
        self.state_mut().decide()
    }

    pub fn decide_to_continue(&mut self) -> bool {
        self.state_mut().decide_to_continue()
    }

    pub fn get_generation_summary(&self) -> GenerationSummary {
        self.state().get_generation_summary()
    }

    /// Feed a finished generation's lifespan to the learner
    ///
    /// Returns `None` for a fixed agent, whose threshold never changes.
    pub fn learn_from_history(&mut self, lifespan: StepCount) -> Option<LearningUpdate> {
        match self {
            Self::Fixed(_) => None,
            Self::Learning { state, rule } => {
                let update = rule.learn_from_history(state.give_up_threshold(), lifespan);
                state.set_threshold(update.new_threshold);
                Some(update)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_picks_variant() {
        let config = SimulationConfig::new().with_agent(AgentKind::Learning);
        let agent = Agent::from_config(&config).unwrap();
        assert!(agent.is_learning());
        assert_eq!(agent.kind(), AgentKind::Learning);
        assert_eq!(agent.give_up_threshold(), 50);
    }

    #[test]
    fn test_fixed_agent_never_learns() {
        let mut agent = Agent::fixed(5).unwrap();
        assert!(agent.learn_from_history(100).is_none());
        assert_eq!(agent.give_up_threshold(), 5);
        assert!(agent.learning_rule().is_none());
    }

    #[test]
    fn test_learning_agent_keeps_threshold_across_reset() {
        let mut agent = Agent::learning(10, 1.0).unwrap();
        let update = agent.learn_from_history(30).unwrap();
        assert_eq!(update.new_threshold, 20);

        let before = agent.give_up_threshold();
        agent.reset();
        assert_eq!(agent.give_up_threshold(), before);
        assert_eq!(agent.learning_rule().unwrap().historical_lifespans(), &[10, 30]);
    }

    #[test]
    fn test_learning_agent_rejects_bad_rate() {
        assert!(Agent::learning(10, 2.0).is_err());
    }

    #[test]
    fn test_reset_clears_generation_counters() {
        let mut agent = Agent::learning(3, 0.5).unwrap();
        agent.record_step(false);
        agent.record_step(true);
        agent.reset();
        let summary = agent.get_generation_summary();
        assert_eq!(summary.lifespan, 0);
        assert_eq!(summary.total_rewards, 0);
        assert!(summary.decision_log.is_empty());
    }
}
