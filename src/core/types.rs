//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex characters, for folder names and log lines
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based generation index
pub type Generation = u32;

/// Step counter within a generation or across the whole run
pub type StepCount = u64;

/// Which agent variant a run uses
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    #[display(fmt = "FixedAgent")]
    Fixed,
    #[display(fmt = "LearningAgent")]
    Learning,
}

/// Why a generation stopped
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    #[display(fmt = "Agent Threshold Reached")]
    ThresholdReached,
    #[display(fmt = "Max Steps Reached")]
    MaxStepsReached,
}
