//! Generation loop and run driver
//!
//! A run is strictly sequential: generation N+1 starts only after
//! generation N has finished and, for a learning agent, after the
//! threshold has been updated from its lifespan.

pub mod driver;
pub mod generation;
pub mod observer;

pub use driver::{simulate, CancelFlag, Simulation, SimulationResult, Termination};
pub use generation::{run_generation, GenerationRecord};
pub use observer::{
    EventRecorder, JsonLinesWriter, NullObserver, ObservedEvent, SimulationObserver,
    TracingObserver,
};
