use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lizard_rl_agent::{TrainingConfig, TrainingSession};
use lizard_rl_core::{Move, QTable, Reward, START};
use lizard_rl_env::LizardEnv;

fn bench_training_run(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    c.bench_function("train_100_episodes", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let config = TrainingConfig {
                    seed: Some(7),
                    ..Default::default()
                };
                let mut session = TrainingSession::new(config).expect("config");
                let report = session
                    .train_headless(&mut LizardEnv::new())
                    .await
                    .expect("training");
                black_box(report.total_steps)
            })
        });
    });
}

fn bench_q_update(c: &mut Criterion) {
    let mut table = QTable::new();
    c.bench_function("q_table_update", |b| {
        b.iter(|| {
            table.update(
                black_box(START.index()),
                Move::Right,
                Reward(-1.0),
                black_box(START.index()),
            )
        });
    });
}

criterion_group!(benches, bench_training_run, bench_q_update);
criterion_main!(benches);
