//! Log routing: run events reach `tracing` only through an observer

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use threshold_gambit::simulation::TracingObserver;
use threshold_gambit::{
    Agent, AgentKind, CancelFlag, Simulation, SimulationConfig, StochasticEnvironment,
};

/// Shared in-memory sink for a test subscriber
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<F: FnOnce()>(f: F) -> String {
    let sink = Captured::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    sink.text()
}

#[test]
fn test_components_emit_nothing_on_their_own() {
    let logged = capture(|| {
        let mut env = StochasticEnvironment::new(0.5, ChaCha8Rng::seed_from_u64(3)).unwrap();
        let mut agent = Agent::learning(5, 0.3).unwrap();
        for _ in 0..20 {
            agent.record_step(env.step());
        }
        agent.learn_from_history(20);
        env.reset_stats();
    });

    assert!(logged.is_empty(), "unexpected log output: {}", logged);
}

#[test]
fn test_tracing_observer_reports_the_run() {
    let config = SimulationConfig::new()
        .with_name("logged_run")
        .with_generations(3)
        .with_agent(AgentKind::Learning)
        .with_threshold(4)
        .with_reward_probability(0.2)
        .with_seed(8);

    let logged = capture(|| {
        let simulation = Simulation::new(config).unwrap();
        simulation.run(&mut TracingObserver::new(), &CancelFlag::new());
    });

    assert!(logged.contains("Starting simulation: logged_run"));
    assert!(logged.contains("LearningRate=0.05"));
    assert!(logged.contains("Learning update"));
    assert!(logged.contains("Simulation finished: logged_run"));
}
