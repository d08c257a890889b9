//! Simulation output and serialization

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::RunSummary;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::RunId;
use crate::simulation::{SimulationResult, Termination};

pub const RESULTS_FILE: &str = "results.json";
pub const SUMMARY_FILE: &str = "summary.txt";

/// Document written to `results.json`: the raw result plus its analysis
#[derive(Serialize)]
struct ResultsDocument<'a> {
    #[serde(flatten)]
    result: &'a SimulationResult,
    analysis: RunSummary,
}

impl SimulationResult {
    /// Pretty JSON of the result with an `analysis` section appended
    ///
    /// [`SimulationResult::from_json`] ignores the extra section.
    pub fn to_json(&self) -> Result<String> {
        let document = ResultsDocument {
            result: self,
            analysis: RunSummary::from_result(self),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn summary(&self) -> String {
        let report = RunSummary::from_result(self);
        let mut lines = vec![
            format!("Simulation: {} ({})", self.config.simulation_name, self.run_id.short()),
            format!(
                "Agent: {}, initial threshold {}, seed {}",
                self.config.agent_type, self.config.agent_initial_threshold, self.seed
            ),
            format!(
                "Completed {} of {} generations in {:.2}s ({})",
                self.completed(),
                self.config.num_generations,
                self.wall_time.as_secs_f64(),
                termination_label(&self.termination)
            ),
        ];

        if let Some(stats) = &report.lifespan {
            lines.push(format!(
                "Lifespan: mean {:.2}, median {:.2}, min {}, max {}, std {:.2}",
                stats.mean, stats.median, stats.min, stats.max, stats.std_dev
            ));
        }

        lines.push(format!(
            "Ends: {} threshold, {} max steps",
            report.end_reasons.threshold_reached, report.end_reasons.max_steps_reached
        ));

        if let (Some(first), Some(last)) = (report.trend.first(), report.trend.last()) {
            lines.push(format!(
                "Lifespan trend (window {}): {:.2} -> {:.2}",
                report.trend_window, first, last
            ));
        }

        if let Some(t) = &report.thresholds {
            lines.push(format!(
                "Threshold: initial {}, final {}, min {}, max {}, mean {:.2}",
                t.initial, t.final_threshold, t.min, t.max, t.mean
            ));
        }

        lines.push(format!(
            "Environment: {} steps, {} rewards, actual rate {:.5} (configured {:.5})",
            self.environment.total_steps,
            self.environment.total_rewards,
            self.environment.actual_reward_rate,
            self.environment.configured_reward_probability
        ));

        lines.join("\n")
    }
}

fn termination_label(termination: &Termination) -> String {
    match termination {
        Termination::Completed => "completed".to_string(),
        Termination::Interrupted => "interrupted".to_string(),
        Termination::Failed { generation, message } => {
            format!("failed in generation {}: {}", generation, message)
        }
    }
}

/// `{name}_{agent}_Thresh{t}_{run}` with non-alphanumerics in the name replaced
pub fn run_folder_name(config: &SimulationConfig, run_id: RunId) -> String {
    let safe_name: String = config
        .simulation_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    format!(
        "{}_{}_Thresh{}_{}",
        safe_name,
        config.agent_type,
        config.agent_initial_threshold,
        run_id.short()
    )
}

/// Write `results.json` and `summary.txt` into `dir`, creating it if needed
pub fn write_run(dir: &Path, result: &SimulationResult) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(RESULTS_FILE), result.to_json()?)?;
    fs::write(dir.join(SUMMARY_FILE), result.summary())?;
    tracing::info!("Results written to {}", dir.display());
    Ok(dir.join(RESULTS_FILE))
}
