//! Threshold Gambit - generational give-up threshold simulation
//!
//! An agent takes rewards and punishments from a stochastic environment
//! and gives up once its punishment streak reaches a threshold. A learning
//! agent moves that threshold between generations toward its historical
//! average lifespan.

pub mod agent;
pub mod analysis;
pub mod core;
pub mod environment;
pub mod output;
pub mod simulation;

pub use crate::agent::{
    Agent, AgentState, DecisionEvent, GenerationSummary, LearningRule, LearningUpdate,
};
pub use crate::core::{AgentKind, EndReason, GambitError, Result, SimulationConfig};
pub use crate::environment::{EnvironmentStats, StochasticEnvironment};
pub use crate::simulation::{
    simulate, CancelFlag, GenerationRecord, Simulation, SimulationObserver, SimulationResult,
    Termination,
};
