//! Threshold learning between generations
//!
//! After each generation the learner appends the lifespan to its history
//! and pulls the threshold toward the rounded mean of that history.
//! The history is seeded with the initial threshold and never windowed,
//! so late generations move the mean less and less.

use serde::{Deserialize, Serialize};

use crate::core::config::validate_unit_interval;
use crate::core::error::Result;
use crate::core::types::StepCount;

/// What one learning step observed and decided
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningUpdate {
    pub lifespan: StepCount,
    pub historical_average: f64,
    pub target_threshold: u32,
    pub previous_threshold: u32,
    pub new_threshold: u32,
}

/// Learning rate plus the append-only lifespan history
#[derive(Debug, Clone, PartialEq)]
pub struct LearningRule {
    learning_rate: f64,
    historical_lifespans: Vec<StepCount>,
}

impl LearningRule {
    pub fn new(initial_threshold: u32, learning_rate: f64) -> Result<Self> {
        validate_unit_interval("learning_rate", learning_rate)?;

        Ok(Self {
            learning_rate,
            historical_lifespans: vec![StepCount::from(initial_threshold)],
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn historical_lifespans(&self) -> &[StepCount] {
        &self.historical_lifespans
    }

    /// Cumulative mean over the whole history, seed included
    pub fn historical_average(&self) -> f64 {
        let sum: u128 = self.historical_lifespans.iter().map(|&l| u128::from(l)).sum();
        sum as f64 / self.historical_lifespans.len() as f64
    }

    /// Record a finished generation and compute the threshold to use next
    pub fn learn_from_history(
        &mut self,
        current_threshold: u32,
        current_lifespan: StepCount,
    ) -> LearningUpdate {
        self.historical_lifespans.push(current_lifespan);

        let historical_average = self.historical_average();
        let target_threshold = Self::target_threshold(historical_average);
        let new_threshold =
            Self::next_threshold(current_threshold, self.learning_rate, historical_average);

        LearningUpdate {
            lifespan: current_lifespan,
            historical_average,
            target_threshold,
            previous_threshold: current_threshold,
            new_threshold,
        }
    }

    /// `max(1, round(average))`, rounding half away from zero
    pub fn target_threshold(average: f64) -> u32 {
        to_threshold(average.round())
    }

    /// Interpolate between the current threshold and the rounded average
    ///
    /// Always at least 1. `learning_rate = 0` keeps the current value,
    /// `learning_rate = 1` jumps straight to the target.
    pub fn next_threshold(current: u32, learning_rate: f64, average: f64) -> u32 {
        let target = Self::target_threshold(average);
        let blended =
            f64::from(current) * (1.0 - learning_rate) + f64::from(target) * learning_rate;
        to_threshold(blended.round())
    }
}

fn to_threshold(value: f64) -> u32 {
    if value.is_nan() || value < 1.0 {
        1
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
