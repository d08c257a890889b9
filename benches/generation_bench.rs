use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use threshold_gambit::simulation::{run_generation, NullObserver};
use threshold_gambit::{simulate, Agent, AgentKind, SimulationConfig, StochasticEnvironment};

fn bench_single_generation(c: &mut Criterion) {
    c.bench_function("generation_threshold_50", |b| {
        let mut env = StochasticEnvironment::new(1.0 / 28.0, ChaCha8Rng::seed_from_u64(1)).unwrap();
        let mut agent = Agent::fixed(50).unwrap();
        b.iter(|| {
            run_generation(1, &mut agent, &mut env, 10_000, &mut NullObserver).unwrap();
        })
    });
}

fn bench_learning_run(c: &mut Criterion) {
    let config = SimulationConfig::new()
        .with_generations(100)
        .with_agent(AgentKind::Learning)
        .with_threshold(20)
        .with_reward_probability(0.1)
        .with_seed(7)
        .with_decision_log(false);

    c.bench_function("learning_run_100_generations", |b| {
        b.iter(|| simulate(black_box(config.clone())).unwrap())
    });
}

criterion_group!(benches, bench_single_generation, bench_learning_run);
criterion_main!(benches);
