//! Threshold sweep
//!
//! Runs the same seeded environment against a range of fixed thresholds
//! and prints how lifespan responds. Useful for picking a sensible
//! starting threshold for learning runs.

use clap::Parser;
use serde::Serialize;

use threshold_gambit::analysis::RunSummary;
use threshold_gambit::{simulate, AgentKind, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "threshold_sweep")]
#[command(about = "Compare fixed give-up thresholds on one seeded environment")]
struct Args {
    /// Smallest threshold to try
    #[arg(long, default_value_t = 1)]
    from: u32,

    /// Largest threshold to try
    #[arg(long, default_value_t = 100)]
    to: u32,

    /// Step between thresholds
    #[arg(long, default_value_t = 10)]
    step: u32,

    /// Generations per threshold
    #[arg(long, default_value_t = 100)]
    generations: u32,

    /// Probability of reward per step
    #[arg(long, default_value_t = 1.0 / 28.0)]
    reward_prob: f64,

    /// Max steps per generation safety break
    #[arg(long, default_value_t = 10_000)]
    max_steps: u64,

    /// Random seed shared by every threshold
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SweepRow {
    threshold: u32,
    mean_lifespan: f64,
    median_lifespan: f64,
    max_lifespan: u64,
    capped_generations: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let step = args.step.max(1);

    let mut rows = Vec::new();
    for threshold in (args.from.max(1)..=args.to).step_by(step as usize) {
        let config = SimulationConfig::new()
            .with_name(format!("sweep_{}", threshold))
            .with_agent(AgentKind::Fixed)
            .with_threshold(threshold)
            .with_generations(args.generations)
            .with_reward_probability(args.reward_prob)
            .with_max_steps(args.max_steps)
            .with_seed(args.seed)
            .with_decision_log(false);

        let result = match simulate(config) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };

        let summary = RunSummary::from_result(&result);
        let Some(lifespan) = summary.lifespan else {
            continue;
        };

        rows.push(SweepRow {
            threshold,
            mean_lifespan: lifespan.mean,
            median_lifespan: lifespan.median,
            max_lifespan: lifespan.max,
            capped_generations: summary.end_reasons.max_steps_reached,
        });
    }

    if args.json {
        match serde_json::to_string_pretty(&rows) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }

    println!("{:>9}  {:>10}  {:>10}  {:>8}  {:>6}", "threshold", "mean", "median", "max", "capped");
    for row in &rows {
        println!(
            "{:>9}  {:>10.2}  {:>10.2}  {:>8}  {:>6}",
            row.threshold,
            row.mean_lifespan,
            row.median_lifespan,
            row.max_lifespan,
            row.capped_generations
        );
    }
}
