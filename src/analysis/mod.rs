//! Run-level aggregates for reports
//!
//! Pure numbers only. Plotting and document layout are left to whatever
//! consumes a [`RunSummary`].

pub mod stats;

pub use stats::{
    default_window, freedman_diaconis_bins, histogram, lifespan_histogram, moving_average,
    HistogramBin, LifespanStats,
};

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentKind, EndReason, StepCount};
use crate::environment::EnvironmentStats;
use crate::simulation::{GenerationRecord, SimulationResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndReasonCounts {
    pub threshold_reached: usize,
    pub max_steps_reached: usize,
}

impl EndReasonCounts {
    pub fn from_records(records: &[GenerationRecord]) -> Self {
        records.iter().fold(Self::default(), |mut counts, r| {
            match r.end_reason {
                EndReason::ThresholdReached => counts.threshold_reached += 1,
                EndReason::MaxStepsReached => counts.max_steps_reached += 1,
            }
            counts
        })
    }
}

/// How a learning agent's threshold moved over the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdDynamics {
    pub initial: u32,
    /// Threshold used by the last completed generation
    pub final_threshold: u32,
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

impl ThresholdDynamics {
    pub fn from_records(initial: u32, records: &[GenerationRecord]) -> Option<Self> {
        let thresholds: Vec<u32> = records.iter().map(|r| r.threshold_used).collect();
        let final_threshold = *thresholds.last()?;

        Some(Self {
            initial,
            final_threshold,
            min: thresholds.iter().copied().min().unwrap_or(final_threshold),
            max: thresholds.iter().copied().max().unwrap_or(final_threshold),
            mean: thresholds.iter().map(|&t| f64::from(t)).sum::<f64>() / thresholds.len() as f64,
        })
    }
}

/// Everything the overall-results section of a report shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generations_run: usize,
    pub lifespan: Option<LifespanStats>,
    pub total_rewards_received: StepCount,
    pub total_punishments_received: StepCount,
    pub average_rewards_per_generation: f64,
    pub end_reasons: EndReasonCounts,
    /// Only present for learning runs with at least one generation
    pub thresholds: Option<ThresholdDynamics>,
    pub environment: EnvironmentStats,
    /// Window used for `trend`
    pub trend_window: usize,
    /// Moving average of lifespans over full windows
    pub trend: Vec<f64>,
    pub histogram: Vec<HistogramBin>,
}

impl RunSummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        let records = &result.generations;
        let lifespans: Vec<StepCount> = result.lifespans().collect();

        let total_rewards_received = records.iter().map(|r| r.summary.total_rewards).sum();
        let total_punishments_received = records.iter().map(|r| r.summary.total_punishments).sum();
        let average_rewards_per_generation = if records.is_empty() {
            0.0
        } else {
            total_rewards_received as f64 / records.len() as f64
        };

        let thresholds = match result.config.agent_type {
            AgentKind::Learning => {
                ThresholdDynamics::from_records(result.config.agent_initial_threshold, records)
            }
            AgentKind::Fixed => None,
        };

        let trend_window = default_window(lifespans.len());

        Self {
            generations_run: records.len(),
            lifespan: LifespanStats::from_lifespans(&lifespans),
            total_rewards_received,
            total_punishments_received,
            average_rewards_per_generation,
            end_reasons: EndReasonCounts::from_records(records),
            thresholds,
            environment: result.environment,
            trend_window,
            trend: moving_average(&lifespans, trend_window),
            histogram: lifespan_histogram(&lifespans),
        }
    }
}
