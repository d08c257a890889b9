//! Observers for simulation events
//!
//! The engine never logs directly. It reports run, generation, decision
//! and learning events to a [`SimulationObserver`]; the tracing backend,
//! tests and trace writers all plug in here.

use std::io::Write;

use crate::agent::{DecisionEvent, LearningUpdate};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{AgentKind, EndReason, Generation};
use crate::simulation::driver::{SimulationResult, Termination};
use crate::simulation::generation::GenerationRecord;

/// Receives structured events as a run progresses
///
/// Every hook defaults to a no-op. An `Err` from any hook during the
/// generation loop stops the run with [`Termination::Failed`].
pub trait SimulationObserver {
    fn on_run_start(&mut self, _config: &SimulationConfig, _seed: u64) -> Result<()> {
        Ok(())
    }

    fn on_generation_start(&mut self, _generation: Generation, _threshold: u32) -> Result<()> {
        Ok(())
    }

    fn on_decision(&mut self, _generation: Generation, _event: &DecisionEvent) -> Result<()> {
        Ok(())
    }

    fn on_generation_end(
        &mut self,
        _record: &GenerationRecord,
        _total_generations: u32,
    ) -> Result<()> {
        Ok(())
    }

    fn on_learning_update(
        &mut self,
        _generation: Generation,
        _update: &LearningUpdate,
    ) -> Result<()> {
        Ok(())
    }

    fn on_run_end(&mut self, _result: &SimulationResult) -> Result<()> {
        Ok(())
    }
}

impl<O: SimulationObserver + ?Sized> SimulationObserver for &mut O {
    fn on_run_start(&mut self, config: &SimulationConfig, seed: u64) -> Result<()> {
        (**self).on_run_start(config, seed)
    }

    fn on_generation_start(&mut self, generation: Generation, threshold: u32) -> Result<()> {
        (**self).on_generation_start(generation, threshold)
    }

    fn on_decision(&mut self, generation: Generation, event: &DecisionEvent) -> Result<()> {
        (**self).on_decision(generation, event)
    }

    fn on_generation_end(
        &mut self,
        record: &GenerationRecord,
        total_generations: u32,
    ) -> Result<()> {
        (**self).on_generation_end(record, total_generations)
    }

    fn on_learning_update(
        &mut self,
        generation: Generation,
        update: &LearningUpdate,
    ) -> Result<()> {
        (**self).on_learning_update(generation, update)
    }

    fn on_run_end(&mut self, result: &SimulationResult) -> Result<()> {
        (**self).on_run_end(result)
    }
}

/// Forwards every event to both observers, first error wins
impl<A: SimulationObserver, B: SimulationObserver> SimulationObserver for (A, B) {
    fn on_run_start(&mut self, config: &SimulationConfig, seed: u64) -> Result<()> {
        self.0.on_run_start(config, seed)?;
        self.1.on_run_start(config, seed)
    }

    fn on_generation_start(&mut self, generation: Generation, threshold: u32) -> Result<()> {
        self.0.on_generation_start(generation, threshold)?;
        self.1.on_generation_start(generation, threshold)
    }

    fn on_decision(&mut self, generation: Generation, event: &DecisionEvent) -> Result<()> {
        self.0.on_decision(generation, event)?;
        self.1.on_decision(generation, event)
    }

    fn on_generation_end(
        &mut self,
        record: &GenerationRecord,
        total_generations: u32,
    ) -> Result<()> {
        self.0.on_generation_end(record, total_generations)?;
        self.1.on_generation_end(record, total_generations)
    }

    fn on_learning_update(
        &mut self,
        generation: Generation,
        update: &LearningUpdate,
    ) -> Result<()> {
        self.0.on_learning_update(generation, update)?;
        self.1.on_learning_update(generation, update)
    }

    fn on_run_end(&mut self, result: &SimulationResult) -> Result<()> {
        self.0.on_run_end(result)?;
        self.1.on_run_end(result)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// Emits `tracing` events
///
/// Per-step decisions go to TRACE, generation boundaries to DEBUG,
/// safety-cap hits to WARN, learning and progress to INFO.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    simulation_name: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress is logged roughly twenty times per run
    pub fn progress_interval(total_generations: u32) -> u32 {
        (total_generations / 20).max(1)
    }
}

impl SimulationObserver for TracingObserver {
    fn on_run_start(&mut self, config: &SimulationConfig, seed: u64) -> Result<()> {
        self.simulation_name = config.simulation_name.clone();
        tracing::info!("Starting simulation: {}", config.simulation_name);
        tracing::info!(
            "Parameters: Gens={}, RewardProb={:.5}, Agent={}, InitThresh={}, MaxSteps={}, Seed={}",
            config.num_generations,
            config.reward_probability,
            config.agent_type,
            config.agent_initial_threshold,
            config.max_steps_per_generation,
            seed
        );
        if config.agent_type == AgentKind::Learning {
            tracing::info!("LearningRate={}", config.learning_rate);
        }
        Ok(())
    }

    fn on_generation_start(&mut self, generation: Generation, threshold: u32) -> Result<()> {
        tracing::debug!(generation, threshold, "Generation start");
        Ok(())
    }

    fn on_decision(&mut self, generation: Generation, event: &DecisionEvent) -> Result<()> {
        tracing::trace!(generation, "{}", event);
        Ok(())
    }

    fn on_generation_end(
        &mut self,
        record: &GenerationRecord,
        total_generations: u32,
    ) -> Result<()> {
        let generation = record.generation_index;
        let lifespan = record.summary.lifespan;

        match record.end_reason {
            EndReason::MaxStepsReached => tracing::warn!(
                "Generation {} terminated at step {}: {}",
                generation,
                lifespan,
                record.end_reason
            ),
            EndReason::ThresholdReached => tracing::debug!(
                "Generation {} ended at step {}: {}",
                generation,
                lifespan,
                record.end_reason
            ),
        }

        let interval = Self::progress_interval(total_generations);
        if generation % interval == 0 || generation == total_generations {
            tracing::info!(
                "Generation {}/{} finished. Lifespan: {}. Reason: {}. Time: {:.3}s",
                generation,
                total_generations,
                lifespan,
                record.end_reason,
                record.duration.as_secs_f64()
            );
        }
        Ok(())
    }

    fn on_learning_update(
        &mut self,
        generation: Generation,
        update: &LearningUpdate,
    ) -> Result<()> {
        tracing::info!(
            generation,
            "Learning update. Avg lifespan (hist): {:.2}. Target threshold: {}. New threshold: {}",
            update.historical_average,
            update.target_threshold,
            update.new_threshold
        );
        Ok(())
    }

    fn on_run_end(&mut self, result: &SimulationResult) -> Result<()> {
        let completed = result.generations.len();
        let wall = result.wall_time.as_secs_f64();

        tracing::info!("Simulation finished: {}", self.simulation_name);
        match &result.termination {
            Termination::Completed => {}
            Termination::Interrupted => {
                tracing::warn!(
                    "Simulation interrupted; keeping {} completed generations",
                    completed
                )
            }
            Termination::Failed { generation, message } => tracing::error!(
                "Simulation halted in generation {}: {}",
                generation,
                message
            ),
        }
        tracing::info!("Total wall clock time: {:.2} seconds", wall);
        tracing::info!(
            "Completed {} out of {} specified generations",
            completed,
            result.config.num_generations
        );
        tracing::info!(
            "Final environment stats: Total Steps={}, Actual Reward Rate={:.5}",
            result.environment.total_steps,
            result.environment.actual_reward_rate
        );

        if completed > 0 {
            let total: u64 = result.lifespans().sum();
            tracing::info!("Average time per generation: {:.3} seconds", wall / completed as f64);
            tracing::info!(
                "Overall average lifespan: {:.2} steps",
                total as f64 / completed as f64
            );
        }
        Ok(())
    }
}

/// Streams each finished generation as one JSON line
///
/// Write failures surface as observer errors and stop the run.
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SimulationObserver for JsonLinesWriter<W> {
    fn on_generation_end(
        &mut self,
        record: &GenerationRecord,
        _total_generations: u32,
    ) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn on_run_end(&mut self, _result: &SimulationResult) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One captured observer callback
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    RunStart { seed: u64 },
    GenerationStart { generation: Generation, threshold: u32 },
    Decision { generation: Generation, event: DecisionEvent },
    GenerationEnd { generation: Generation, end_reason: EndReason },
    Learning { generation: Generation, update: LearningUpdate },
    RunEnd { generations: usize },
}

/// Keeps every event in memory, in order
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    pub events: Vec<ObservedEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decisions(&self) -> impl Iterator<Item = &DecisionEvent> {
        self.events.iter().filter_map(|e| match e {
            ObservedEvent::Decision { event, .. } => Some(event),
            _ => None,
        })
    }

    pub fn learning_updates(&self) -> impl Iterator<Item = &LearningUpdate> {
        self.events.iter().filter_map(|e| match e {
            ObservedEvent::Learning { update, .. } => Some(update),
            _ => None,
        })
    }
}

impl SimulationObserver for EventRecorder {
    fn on_run_start(&mut self, _config: &SimulationConfig, seed: u64) -> Result<()> {
        self.events.push(ObservedEvent::RunStart { seed });
        Ok(())
    }

    fn on_generation_start(&mut self, generation: Generation, threshold: u32) -> Result<()> {
        self.events.push(ObservedEvent::GenerationStart { generation, threshold });
        Ok(())
    }

    fn on_decision(&mut self, generation: Generation, event: &DecisionEvent) -> Result<()> {
        self.events.push(ObservedEvent::Decision { generation, event: *event });
        Ok(())
    }

    fn on_generation_end(
        &mut self,
        record: &GenerationRecord,
        _total_generations: u32,
    ) -> Result<()> {
        self.events.push(ObservedEvent::GenerationEnd {
            generation: record.generation_index,
            end_reason: record.end_reason,
        });
        Ok(())
    }

    fn on_learning_update(
        &mut self,
        generation: Generation,
        update: &LearningUpdate,
    ) -> Result<()> {
        self.events.push(ObservedEvent::Learning { generation, update: *update });
        Ok(())
    }

    fn on_run_end(&mut self, result: &SimulationResult) -> Result<()> {
        self.events.push(ObservedEvent::RunEnd { generations: result.generations.len() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_interval() {
        assert_eq!(TracingObserver::progress_interval(5), 1);
        assert_eq!(TracingObserver::progress_interval(100), 5);
        assert_eq!(TracingObserver::progress_interval(1000), 50);
    }

    #[test]
    fn test_pair_forwards_to_both() {
        let mut pair = (EventRecorder::new(), EventRecorder::new());
        pair.on_generation_start(1, 7).unwrap();
        assert_eq!(pair.0.events.len(), 1);
        assert_eq!(pair.1.events, pair.0.events);
    }

    #[test]
    fn test_json_lines_one_per_generation() {
        let config = SimulationConfig::new()
            .with_generations(3)
            .with_reward_probability(0.0)
            .with_threshold(2)
            .with_seed(1);
        let mut writer = JsonLinesWriter::new(Vec::new());
        crate::simulation::Simulation::new(config)
            .unwrap()
            .run(&mut writer, &crate::simulation::CancelFlag::new());

        assert_eq!(writer.lines_written(), 3);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let first: GenerationRecord = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first.generation_index, 1);
        assert_eq!(first.summary.lifespan, 2);
    }

    #[test]
    fn test_recorder_filters_decisions() {
        let mut recorder = EventRecorder::new();
        recorder.on_generation_start(1, 2).unwrap();
        recorder
            .on_decision(1, &DecisionEvent::Punishment { step: 1, streak: 1 })
            .unwrap();
        assert_eq!(recorder.decisions().count(), 1);
    }
}
