//! Simulation configuration with documented defaults
//!
//! Every knob a run recognizes lives here, together with the validation
//! that turns bad values into `InvalidConfiguration` before anything runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GambitError, Result};
use crate::core::types::AgentKind;

/// Configuration for one simulation run
///
/// Loaded from TOML or built in code. Missing fields fall back to
/// [`SimulationConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Label carried into logs and output folder names
    pub simulation_name: String,

    /// Number of generations to run (must be > 0)
    pub num_generations: u32,

    /// Probability of a reward on any single step, in [0, 1]
    ///
    /// The default (1/28) gives roughly one reward every 28 steps,
    /// which is harsh enough that most agents eventually give up.
    pub reward_probability: f64,

    /// Fixed or learning agent
    pub agent_type: AgentKind,

    /// Consecutive punishments tolerated before giving up (must be > 0)
    ///
    /// For a learning agent this is only the starting point.
    pub agent_initial_threshold: u32,

    /// Interpolation weight toward the historical average lifespan, in [0, 1]
    ///
    /// Ignored by fixed agents but still validated.
    pub learning_rate: f64,

    /// Hard cap on steps in one generation (must be > 0)
    ///
    /// Without it a reward probability of 1.0 would never end a generation.
    pub max_steps_per_generation: u64,

    /// RNG seed; `None` draws a fresh one per run
    pub seed: Option<u64>,

    /// Keep the per-step decision log in each generation summary
    ///
    /// Long runs with high thresholds produce millions of entries;
    /// turning this off leaves every counter intact.
    pub record_decision_log: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulation_name: "The_Threshold_Gambit_v1".to_string(),
            num_generations: 100,
            reward_probability: 1.0 / 28.0,
            agent_type: AgentKind::Fixed,
            agent_initial_threshold: 50,
            learning_rate: 0.05,
            max_steps_per_generation: 10_000,
            seed: None,
            record_decision_log: true,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; unspecified keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.simulation_name = name.into();
        self
    }

    pub fn with_generations(mut self, generations: u32) -> Self {
        self.num_generations = generations;
        self
    }

    pub fn with_reward_probability(mut self, probability: f64) -> Self {
        self.reward_probability = probability;
        self
    }

    pub fn with_agent(mut self, kind: AgentKind) -> Self {
        self.agent_type = kind;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.agent_initial_threshold = threshold;
        self
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps_per_generation = max_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_decision_log(mut self, enabled: bool) -> Self {
        self.record_decision_log = enabled;
        self
    }

    /// Validate every parameter before a run is constructed
    pub fn validate(&self) -> Result<()> {
        if self.num_generations == 0 {
            return Err(GambitError::invalid("num_generations must be positive"));
        }

        if self.agent_initial_threshold == 0 {
            return Err(GambitError::invalid("agent_initial_threshold must be positive"));
        }

        if self.max_steps_per_generation == 0 {
            return Err(GambitError::invalid("max_steps_per_generation must be positive"));
        }

        validate_unit_interval("reward_probability", self.reward_probability)?;
        validate_unit_interval("learning_rate", self.learning_rate)?;

        Ok(())
    }
}

/// Reject NaN and anything outside [0, 1]
pub(crate) fn validate_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GambitError::invalid(format!(
            "{} must be between 0.0 and 1.0 (got {})",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_generations_rejected() {
        let config = SimulationConfig::new().with_generations(0);
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = SimulationConfig::new().with_threshold(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let config = SimulationConfig::new().with_max_steps(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_bounds() {
        assert!(SimulationConfig::new().with_reward_probability(0.0).validate().is_ok());
        assert!(SimulationConfig::new().with_reward_probability(1.0).validate().is_ok());
        assert!(SimulationConfig::new().with_reward_probability(1.01).validate().is_err());
        assert!(SimulationConfig::new().with_reward_probability(-0.1).validate().is_err());
        assert!(SimulationConfig::new().with_reward_probability(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_learning_rate_bounds() {
        assert!(SimulationConfig::new().with_learning_rate(1.5).validate().is_err());
        assert!(SimulationConfig::new().with_learning_rate(0.0).validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            simulation_name = "short_run"
            num_generations = 10
            agent_type = "learning"
            seed = 7
        "#;

        let config = SimulationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.simulation_name, "short_run");
        assert_eq!(config.num_generations, 10);
        assert_eq!(config.agent_type, AgentKind::Learning);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.agent_initial_threshold, 50);
        assert_eq!(config.max_steps_per_generation, 10_000);
    }

    #[test]
    fn test_bundled_configs_parse() {
        let learning =
            SimulationConfig::from_toml_str(include_str!("../../data/configs/learning_agent.toml"))
                .unwrap();
        assert_eq!(learning.agent_type, AgentKind::Learning);
        assert_eq!(learning.num_generations, 500);

        let fixed =
            SimulationConfig::from_toml_str(include_str!("../../data/configs/fixed_agent.toml"))
                .unwrap();
        assert_eq!(fixed.agent_type, AgentKind::Fixed);
        assert_eq!(fixed.seed, None);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let toml_str = "reward_probability = 2.0";
        let err = SimulationConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, GambitError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = SimulationConfig::from_toml_str("num_generations = \"many\"").unwrap_err();
        assert!(matches!(err, GambitError::ConfigParse(_)));
    }
}
