// Lizard grid world CLI
// Trains Q-tables, then replays or prints them

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lizard_rl_agent::{
    CancelToken, FixedDelay, PlaybackOutcome, QTableCheckpoint, RunHooks,
    SnapshotObserver, TrainingConfig, TrainingReport, TrainingSession,
};
use lizard_rl_core::RLError;
use lizard_rl_env::{GridModel, LizardEnv};

mod render;

use render::{render_policy, render_q_table, JsonRenderer, TextRenderer};

const DEFAULT_TRAIN_PACE_MS: u64 = 5;
const DEFAULT_PLAYBACK_PACE_MS: u64 = 500;

#[derive(Parser)]
#[command(name = "lizardctl")]
#[command(about = "Q-learning lizard on a 3x3 grid", version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a fresh table
    Train {
        /// Number of training episodes
        #[arg(long)]
        episodes: Option<usize>,

        /// Step budget per episode
        #[arg(long)]
        max_steps: Option<usize>,

        /// Milliseconds between training steps, 0 for none [default: 5, or a
        /// nonzero step_delay_ms from --config]
        #[arg(long)]
        pace_ms: Option<u64>,

        /// Seed for the exploration generator
        #[arg(long)]
        seed: Option<u64>,

        /// JSON training config; flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the learned table here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Replay the greedy policy once training finishes
        #[arg(long)]
        play: bool,

        /// Render every training step, not just episode boundaries
        #[arg(long)]
        every_step: bool,

        /// Snapshot output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Replay the greedy policy of a saved table
    Play {
        /// Checkpoint to load
        #[arg(long)]
        load: PathBuf,

        /// Give up after this many moves
        #[arg(long)]
        cap: Option<usize>,

        /// Milliseconds between moves
        #[arg(long, default_value_t = DEFAULT_PLAYBACK_PACE_MS)]
        pace_ms: u64,

        /// Snapshot output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print a saved table and its greedy policy
    Show {
        /// Checkpoint to load
        #[arg(long)]
        load: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = CancelToken::new();
    spawn_ctrl_c(cancel.clone());

    let result = match cli.command {
        Commands::Train {
            episodes,
            max_steps,
            pace_ms,
            seed,
            config,
            save,
            play,
            every_step,
            format,
        } => {
            let mut config = match config {
                Some(path) => TrainingConfig::load(&path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => TrainingConfig::default(),
            };
            if let Some(episodes) = episodes {
                config.episodes = episodes;
            }
            if let Some(max_steps) = max_steps {
                config.max_steps = max_steps;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            apply_pacing(&mut config, pace_ms);
            train(config, save, play, every_step, format, cancel).await
        }
        Commands::Play {
            load,
            cap,
            pace_ms,
            format,
        } => play(load, cap, pace_ms, format, cancel).await,
        Commands::Show { load } => show(load).await,
    };

    match result {
        Err(e) if matches!(e.downcast_ref::<RLError>(), Some(RLError::Cancelled)) => {
            warn!("interrupted");
            Ok(())
        }
        other => other,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spawn_ctrl_c(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping at the next step");
            cancel.cancel();
        }
    });
}

fn observer_for(format: Format, every_step: bool) -> Box<dyn SnapshotObserver> {
    match format {
        Format::Text => Box::new(TextRenderer::new(every_step)),
        Format::Json => Box::new(JsonRenderer),
    }
}

/// Zero delays in the config fall back to the CLI defaults; `--pace-ms` wins over both
fn apply_pacing(config: &mut TrainingConfig, pace_ms: Option<u64>) {
    if config.step_delay_ms == 0 {
        config.step_delay_ms = DEFAULT_TRAIN_PACE_MS;
    }
    if config.playback_delay_ms == 0 {
        config.playback_delay_ms = DEFAULT_PLAYBACK_PACE_MS;
    }
    if let Some(pace_ms) = pace_ms {
        config.step_delay_ms = pace_ms;
    }
}

/// Train, then save the table if asked. An interrupted run still saves
/// what its finished steps learned before the cancellation is returned.
async fn train_and_save(
    session: &mut TrainingSession,
    env: &mut LizardEnv,
    hooks: &mut RunHooks<'_>,
    save: Option<&Path>,
) -> Result<TrainingReport> {
    let result = session.run_training(env, hooks).await;
    let keep = matches!(result, Ok(_) | Err(RLError::Cancelled));
    if let (Some(path), true) = (save, keep) {
        session
            .checkpoint()
            .save(path)
            .await
            .with_context(|| format!("Failed to save table to {}", path.display()))?;
    }
    Ok(result?)
}

async fn train(
    config: TrainingConfig,
    save: Option<PathBuf>,
    play: bool,
    every_step: bool,
    format: Format,
    cancel: CancelToken,
) -> Result<()> {
    let mut session = TrainingSession::new(config)?;
    let mut env = LizardEnv::new();

    let report = {
        let mut observer = observer_for(format, every_step);
        let mut pacer = FixedDelay(session.config().step_delay());
        let mut hooks =
            RunHooks::new(&mut *observer, &mut pacer).with_cancel(cancel.clone());
        train_and_save(&mut session, &mut env, &mut hooks, save.as_deref()).await?
    };
    if format == Format::Text {
        print_summary(&report);
        println!("{}", render_policy(&GridModel::new(), session.q_table()));
    }

    if play {
        let mut observer = observer_for(format, true);
        let mut pacer = FixedDelay(session.config().playback_delay());
        let mut hooks = RunHooks::new(&mut *observer, &mut pacer).with_cancel(cancel);
        let outcome = session.run_playback(&mut env, &mut hooks).await?;
        print_outcome(&outcome, format);
    }
    Ok(())
}

async fn play(
    load: PathBuf,
    cap: Option<usize>,
    pace_ms: u64,
    format: Format,
    cancel: CancelToken,
) -> Result<()> {
    let mut checkpoint = QTableCheckpoint::load(&load)
        .await
        .with_context(|| format!("Failed to load table {}", load.display()))?;
    if let Some(cap) = cap {
        checkpoint.config.playback_step_cap = cap;
    }
    let mut session = TrainingSession::resume(checkpoint)?;
    let mut env = LizardEnv::new();

    let mut observer = observer_for(format, true);
    let mut pacer = FixedDelay::from_millis(pace_ms);
    let mut hooks = RunHooks::new(&mut *observer, &mut pacer).with_cancel(cancel);
    let outcome = session.run_playback(&mut env, &mut hooks).await?;
    print_outcome(&outcome, format);
    Ok(())
}

async fn show(load: PathBuf) -> Result<()> {
    let checkpoint = QTableCheckpoint::load(&load)
        .await
        .with_context(|| format!("Failed to load table {}", load.display()))?;

    println!("Checkpoint {}", checkpoint.id);
    println!("   Created: {}", checkpoint.created_at);
    println!("   Episodes trained: {}", checkpoint.episodes_trained);
    println!("   Steps: {}", checkpoint.total_steps);
    println!("   Exploration rate: {:.3}", checkpoint.exploration_rate);
    println!();
    println!("{}", render_q_table(&checkpoint.q_table.snapshot()));
    println!("{}", render_policy(&GridModel::new(), &checkpoint.q_table));
    Ok(())
}

fn print_summary(report: &TrainingReport) {
    println!("Training finished");
    println!("   Episodes: {}", report.episodes.len());
    println!("   Steps: {}", report.total_steps);
    println!(
        "   Goals reached: {} ({:.1}%)",
        report.goals_reached(),
        report.success_rate() * 100.0
    );
    println!("   Average reward: {:.2}", report.average_reward());
    println!("   Exploration rate: {:.3}", report.exploration_rate);
    println!();
}

fn print_outcome(outcome: &PlaybackOutcome, format: Format) {
    match format {
        Format::Json => match serde_json::to_string(outcome) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "could not encode playback outcome"),
        },
        Format::Text => match outcome {
            PlaybackOutcome::ReachedTerminal {
                cell,
                steps,
                penalties,
            } => println!(
                "Reached {cell} in {steps} moves ({penalties} blocked moves penalized)"
            ),
            PlaybackOutcome::StepCapExceeded { steps, position } => println!(
                "Gave up after {steps} moves at {position}; the table looks undertrained"
            ),
        },
    }
}
