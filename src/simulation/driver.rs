//! Main simulation loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::core::config::SimulationConfig;
use crate::core::error::{GambitError, Result};
use crate::core::types::{Generation, RunId, StepCount};
use crate::environment::{EnvironmentStats, StochasticEnvironment};
use crate::simulation::generation::{duration_secs, run_generation, GenerationRecord};
use crate::simulation::observer::{NullObserver, SimulationObserver};

/// Shared stop request, checked between generations
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Completed,
    /// Stopped at a generation boundary by a cancel request
    Interrupted,
    /// A fault inside the loop; records up to the failing generation are kept
    Failed { generation: Generation, message: String },
}

/// Everything a run produced, handed to reporting as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub run_id: RunId,
    pub config: SimulationConfig,
    /// Seed actually used, even when the config left it unset
    pub seed: u64,
    pub generations: Vec<GenerationRecord>,
    pub environment: EnvironmentStats,
    pub termination: Termination,
    #[serde(with = "duration_secs")]
    pub wall_time: Duration,
}

impl SimulationResult {
    pub fn lifespans(&self) -> impl Iterator<Item = StepCount> + '_ {
        self.generations.iter().map(|g| g.summary.lifespan)
    }

    pub fn completed(&self) -> usize {
        self.generations.len()
    }

    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Completed
    }
}

/// One environment and one agent, owned for the length of a run
#[derive(Debug)]
pub struct Simulation {
    run_id: RunId,
    config: SimulationConfig,
    seed: u64,
    environment: StochasticEnvironment<ChaCha8Rng>,
    agent: Agent,
}

impl Simulation {
    /// Validate the config and build the seeded environment and agent
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let environment = StochasticEnvironment::new(config.reward_probability, rng)?;
        let agent = Agent::from_config(&config)?;

        Ok(Self {
            run_id: RunId::new(),
            config,
            seed,
            environment,
            agent,
        })
    }

    /// Use a caller-chosen id, e.g. one already baked into an output path
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn environment(&self) -> &StochasticEnvironment<ChaCha8Rng> {
        &self.environment
    }

    /// Run every configured generation in order
    ///
    /// Never fails: a cancel request or an observer error ends the loop
    /// early and the records produced so far are returned.
    pub fn run<O: SimulationObserver + ?Sized>(
        mut self,
        observer: &mut O,
        cancel: &CancelFlag,
    ) -> SimulationResult {
        let started = Instant::now();
        let mut generations = Vec::new();

        let termination = match observer.on_run_start(&self.config, self.seed) {
            Err(e) => self.fail(0, e),
            Ok(()) => self.run_generations(&mut *observer, cancel, &mut generations),
        };

        let result = SimulationResult {
            run_id: self.run_id,
            config: self.config,
            seed: self.seed,
            generations,
            environment: self.environment.get_stats(),
            termination,
            wall_time: started.elapsed(),
        };

        if let Err(e) = observer.on_run_end(&result) {
            tracing::error!(run = %result.run_id.short(), "Observer failed at end of run: {}", e);
        }

        result
    }

    fn run_generations<O: SimulationObserver + ?Sized>(
        &mut self,
        observer: &mut O,
        cancel: &CancelFlag,
        generations: &mut Vec<GenerationRecord>,
    ) -> Termination {
        let total = self.config.num_generations;
        let max_steps = self.config.max_steps_per_generation;

        for generation in 1..=total {
            if cancel.is_cancelled() {
                tracing::warn!(
                    "Simulation interrupted before generation {}; processing partial results",
                    generation
                );
                return Termination::Interrupted;
            }

            let record = match run_generation(
                generation,
                &mut self.agent,
                &mut self.environment,
                max_steps,
                &mut *observer,
            ) {
                Ok(record) => record,
                Err(e) => return self.fail(generation, e),
            };

            let lifespan = record.lifespan();
            let ended = observer.on_generation_end(&record, total);
            generations.push(record);
            if let Err(e) = ended {
                return self.fail(generation, e);
            }

            if let Some(update) = self.agent.learn_from_history(lifespan) {
                if let Err(e) = observer.on_learning_update(generation, &update) {
                    return self.fail(generation, e);
                }
            }
        }

        Termination::Completed
    }

    fn fail(&self, generation: Generation, error: GambitError) -> Termination {
        tracing::error!(
            run = %self.run_id.short(),
            generation,
            agent = %self.config.agent_type,
            threshold = self.agent.give_up_threshold(),
            steps = self.environment.get_stats().total_steps,
            "Unexpected error during simulation loop: {}",
            error
        );
        Termination::Failed {
            generation,
            message: error.to_string(),
        }
    }
}

/// Run a whole simulation without observers or cancellation
pub fn simulate(config: SimulationConfig) -> Result<SimulationResult> {
    let simulation = Simulation::new(config)?;
    Ok(simulation.run(&mut NullObserver, &CancelFlag::new()))
}
