//! One generation: reset the agent, then step until it gives up or the
//! safety cap is hit.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Decision, GenerationSummary};
use crate::core::error::Result;
use crate::core::types::{EndReason, Generation, StepCount};
use crate::environment::StochasticEnvironment;
use crate::simulation::observer::SimulationObserver;

/// Immutable outcome of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation_index: Generation,
    pub summary: GenerationSummary,
    pub end_reason: EndReason,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    /// Threshold in force for the whole generation, read right after reset
    pub threshold_used: u32,
}

impl GenerationRecord {
    pub fn lifespan(&self) -> StepCount {
        self.summary.lifespan
    }
}

/// Run a single generation to completion
///
/// A give-up on the last allowed step is reported as `ThresholdReached`;
/// the cap is only checked once the agent has decided to continue.
pub fn run_generation<R, O>(
    generation: Generation,
    agent: &mut Agent,
    environment: &mut StochasticEnvironment<R>,
    max_steps: StepCount,
    observer: &mut O,
) -> Result<GenerationRecord>
where
    R: Rng,
    O: SimulationObserver + ?Sized,
{
    agent.reset();
    let threshold_used = agent.give_up_threshold();
    observer.on_generation_start(generation, threshold_used)?;

    let started = Instant::now();
    let mut steps: StepCount = 0;

    let end_reason = loop {
        steps += 1;

        let is_reward = environment.step();
        let event = agent.record_step(is_reward);
        observer.on_decision(generation, &event)?;

        if let Decision::GiveUp(give_up) = agent.decide() {
            observer.on_decision(generation, &give_up)?;
            break EndReason::ThresholdReached;
        }

        if steps >= max_steps {
            break EndReason::MaxStepsReached;
        }
    };

    Ok(GenerationRecord {
        generation_index: generation,
        summary: agent.get_generation_summary(),
        end_reason,
        duration: started.elapsed(),
        threshold_used,
    })
}

/// Serialize a `Duration` as fractional seconds
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
