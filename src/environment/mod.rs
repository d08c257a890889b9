//! Stochastic reward/punishment environment
//!
//! Each step is a single Bernoulli draw: reward with the configured
//! probability, punishment otherwise. The environment also keeps
//! issuance counters for the whole run.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::validate_unit_interval;
use crate::core::error::Result;
use crate::core::types::StepCount;

/// Snapshot of everything the environment has issued
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentStats {
    pub total_steps: StepCount,
    pub total_rewards: StepCount,
    pub total_punishments: StepCount,
    pub configured_reward_probability: f64,
    /// `total_rewards / total_steps`, or 0.0 before the first step
    pub actual_reward_rate: f64,
}

/// Environment that hands out rewards with a fixed probability
#[derive(Debug, Clone)]
pub struct StochasticEnvironment<R> {
    reward_probability: f64,
    steps_taken: StepCount,
    rewards_issued: StepCount,
    punishments_issued: StepCount,
    rng: R,
}

impl<R: Rng> StochasticEnvironment<R> {
    /// Fails with `InvalidConfiguration` if the probability is outside [0, 1]
    pub fn new(reward_probability: f64, rng: R) -> Result<Self> {
        validate_unit_interval("reward_probability", reward_probability)?;

        Ok(Self {
            reward_probability,
            steps_taken: 0,
            rewards_issued: 0,
            punishments_issued: 0,
            rng,
        })
    }

    /// Draw one outcome: `true` is a reward, `false` a punishment
    pub fn step(&mut self) -> bool {
        let sample: f64 = self.rng.gen();
        let is_reward = sample < self.reward_probability;

        self.steps_taken += 1;
        if is_reward {
            self.rewards_issued += 1;
        } else {
            self.punishments_issued += 1;
        }

        is_reward
    }

    pub fn reward_probability(&self) -> f64 {
        self.reward_probability
    }

    pub fn get_stats(&self) -> EnvironmentStats {
        let actual_reward_rate = if self.steps_taken > 0 {
            self.rewards_issued as f64 / self.steps_taken as f64
        } else {
            0.0
        };

        EnvironmentStats {
            total_steps: self.steps_taken,
            total_rewards: self.rewards_issued,
            total_punishments: self.punishments_issued,
            configured_reward_probability: self.reward_probability,
            actual_reward_rate,
        }
    }

    /// Zero the issuance counters. Never called by the driver mid-run.
    pub fn reset_stats(&mut self) {
        self.steps_taken = 0;
        self.rewards_issued = 0;
        self.punishments_issued = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn env(p: f64) -> StochasticEnvironment<ChaCha8Rng> {
        StochasticEnvironment::new(p, ChaCha8Rng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        assert!(StochasticEnvironment::new(1.5, ChaCha8Rng::seed_from_u64(0)).is_err());
        assert!(StochasticEnvironment::new(-0.01, ChaCha8Rng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_zero_probability_always_punishes() {
        let mut env = env(0.0);
        assert!((0..500).all(|_| !env.step()));
        assert_eq!(env.get_stats().total_punishments, 500);
    }

    #[test]
    fn test_full_probability_always_rewards() {
        let mut env = env(1.0);
        assert!((0..500).all(|_| env.step()));
        assert_eq!(env.get_stats().total_rewards, 500);
    }

    #[test]
    fn test_stats_before_any_step() {
        let stats = env(0.3).get_stats();
        assert_eq!(stats.total_steps, 0);
        assert_eq!(stats.actual_reward_rate, 0.0);
        assert_eq!(stats.configured_reward_probability, 0.3);
    }

    #[test]
    fn test_counters_add_up() {
        let mut env = env(0.25);
        for _ in 0..1000 {
            env.step();
        }
        let stats = env.get_stats();
        assert_eq!(stats.total_steps, 1000);
        assert_eq!(stats.total_rewards + stats.total_punishments, 1000);
        assert!((stats.actual_reward_rate - 0.25).abs() < 0.06);
    }

    #[test]
    fn test_reset_stats() {
        let mut env = env(0.5);
        for _ in 0..10 {
            env.step();
        }
        env.reset_stats();
        assert_eq!(env.get_stats().total_steps, 0);
        assert_eq!(env.get_stats().total_rewards, 0);
    }

    #[test]
    fn test_same_seed_same_outcomes() {
        let mut a = env(0.4);
        let mut b = env(0.4);
        let seq_a: Vec<bool> = (0..200).map(|_| a.step()).collect();
        let seq_b: Vec<bool> = (0..200).map(|_| b.step()).collect();
        assert_eq!(seq_a, seq_b);
    }
}
