pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{GambitError, Result};
pub use types::{AgentKind, EndReason, Generation, RunId, StepCount};
