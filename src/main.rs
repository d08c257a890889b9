//! Threshold Gambit - Entry Point
//!
//! Builds a run from defaults, an optional TOML file and command-line
//! overrides, runs it on a blocking task while listening for Ctrl-C,
//! and writes the results into a fresh output folder.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use tokio::runtime::Runtime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use threshold_gambit::core::types::RunId;
use threshold_gambit::output::{run_folder_name, write_run};
use threshold_gambit::simulation::{JsonLinesWriter, TracingObserver};
use threshold_gambit::{AgentKind, CancelFlag, GambitError, Result, Simulation, SimulationConfig};

/// Run The Threshold Gambit simulation
#[derive(Parser, Debug)]
#[command(name = "threshold-gambit")]
#[command(about = "Simulate an agent deciding when to give up under harsh odds")]
struct Args {
    /// TOML config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations
    #[arg(long)]
    generations: Option<u32>,

    /// Probability of reward per step
    #[arg(long)]
    reward_prob: Option<f64>,

    /// Agent's initial give-up threshold
    #[arg(long)]
    threshold: Option<u32>,

    /// Type of agent
    #[arg(long, value_enum)]
    agent: Option<AgentArg>,

    /// Learning rate for the learning agent
    #[arg(long)]
    lr: Option<f64>,

    /// Max steps per generation safety break
    #[arg(long)]
    max_steps: Option<u64>,

    /// Custom simulation name
    #[arg(long)]
    name: Option<String>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Base directory for results
    #[arg(long, default_value = "simulation_results")]
    output_base: PathBuf,

    /// Logging level (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Do not write simulation.log into the output folder
    #[arg(long)]
    no_log_file: bool,

    /// Drop per-step decision logs from the results
    #[arg(long)]
    no_decision_log: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentArg {
    Fixed,
    Learning,
}

impl From<AgentArg> for AgentKind {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::Fixed => AgentKind::Fixed,
            AgentArg::Learning => AgentKind::Learning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("[ERROR] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    let run_id = RunId::new();
    let output_dir = args.output_base.join(run_folder_name(&config, run_id));
    fs::create_dir_all(&output_dir)?;
    println!("Results will be saved in: {}", output_dir.display());

    let log_file = if args.no_log_file {
        None
    } else {
        Some(output_dir.join("simulation.log"))
    };
    init_tracing(args.log_level, log_file)?;

    let simulation = Simulation::new(config)?.with_run_id(run_id);
    let cancel = CancelFlag::new();
    let records_file = File::create(output_dir.join("generations.jsonl"))?;

    // Create the async runtime only for signal handling
    let rt = Runtime::new()?;
    let result = rt.block_on(async move {
        let flag = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received; stopping after the current generation");
                flag.cancel();
            }
        });

        tokio::task::spawn_blocking(move || {
            let mut observer = (
                TracingObserver::new(),
                JsonLinesWriter::new(BufWriter::new(records_file)),
            );
            simulation.run(&mut observer, &cancel)
        })
        .await
    });
    let result = result.map_err(|e| GambitError::TaskFailed(e.to_string()))?;

    if result.generations.is_empty() {
        tracing::warn!("No generation data was produced; skipping result files");
        println!("\nNo simulation data generated, skipping result files.");
    } else {
        write_run(&output_dir, &result)?;
    }

    println!("\n{}", result.summary());
    println!("\nOutput located in: {}", output_dir.display());
    Ok(())
}

/// Defaults, then the TOML file, then explicit flags
fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(name) = &args.name {
        config.simulation_name = name.clone();
    }
    if let Some(generations) = args.generations {
        config.num_generations = generations;
    }
    if let Some(p) = args.reward_prob {
        config.reward_probability = p;
    }
    if let Some(threshold) = args.threshold {
        config.agent_initial_threshold = threshold;
    }
    if let Some(agent) = args.agent {
        config.agent_type = agent.into();
    }
    if let Some(lr) = args.lr {
        config.learning_rate = lr;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps_per_generation = max_steps;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.no_decision_log {
        config.record_decision_log = false;
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(level: LogLevel, log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("threshold_gambit={}", level.as_str())));

    let file_layer = match &log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    match &log_file {
        Some(path) => tracing::info!(
            "Logging initialized. Level: {:?}. File: {}",
            level,
            path.display()
        ),
        None => tracing::info!("Logging initialized. Level: {:?}. Console only", level),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let argv = std::iter::once("threshold-gambit").chain(extra.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_flags_override_toml_which_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("gambit_cli_{}", RunId::new().short()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.toml");
        fs::write(
            &path,
            concat!(
                "num_generations = 7\n",
                "agent_initial_threshold = 9\n",
                "agent_type = \"learning\"\n",
                "seed = 3\n",
            ),
        )
        .unwrap();

        let args = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--threshold",
            "12",
            "--no-decision-log",
        ]);
        let config = build_config(&args).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        // Flag beats file
        assert_eq!(config.agent_initial_threshold, 12);
        assert!(!config.record_decision_log);
        // File beats default
        assert_eq!(config.num_generations, 7);
        assert_eq!(config.agent_type, AgentKind::Learning);
        assert_eq!(config.seed, Some(3));
        // Untouched keys keep their defaults
        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.max_steps_per_generation, 10_000);
    }

    #[test]
    fn test_invalid_flag_value_rejected_after_merge() {
        let err = build_config(&parse(&["--reward-prob", "1.5"])).unwrap_err();
        assert!(err.is_configuration());
    }
}
