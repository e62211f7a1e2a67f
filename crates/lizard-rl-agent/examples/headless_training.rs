//! Example: train without rendering, then replay the greedy policy

use lizard_rl_agent::{NullObserver, NoPacing, RunHooks, TrainingConfig, TrainingSession};
use lizard_rl_core::Position;
use lizard_rl_env::LizardEnv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = TrainingConfig {
        seed: Some(42),
        ..Default::default()
    };
    let mut session = TrainingSession::new(config)?;
    let mut env = LizardEnv::new();

    let report = session.train_headless(&mut env).await?;
    for episode in report.episodes.iter().step_by(10) {
        println!(
            "Episode {}: Total Reward = {:.2}, Steps = {}",
            episode.index + 1,
            episode.total_reward,
            episode.steps
        );
    }
    println!(
        "\nAverage Reward over {} episodes: {:.2}",
        report.episodes.len(),
        report.average_reward()
    );
    println!("Final exploration rate: {:.3}", session.exploration_rate());

    // Greedy move per cell
    let policy = session.q_table().greedy_policy();
    for pos in Position::all() {
        print!("{} ", policy[pos.index().get()].arrow());
        if pos.x() == 2 {
            println!();
        }
    }

    let (mut observer, mut pacer) = (NullObserver, NoPacing);
    let mut hooks = RunHooks::new(&mut observer, &mut pacer);
    let outcome = session.run_playback(&mut env, &mut hooks).await?;
    println!("\nPlayback: {outcome:?}");

    Ok(())
}
