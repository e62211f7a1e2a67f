//! Training sessions
//!
//! A session is one training run: it owns the Q-table and the exploration
//! rate, which persist across every episode, and the policy that draws
//! exploration decisions. Per-episode counters live in
//! [`EpisodeProgress`](crate::EpisodeProgress) and are thrown away when an
//! episode ends.

use serde::{Deserialize, Serialize};
use tracing::info;

use lizard_rl_core::{Environment, Episode, EpsilonGreedy, Policy, QTable, Result};

use crate::pacing::Headless;
use crate::{
    GreedyPlayback, PlaybackOutcome, QTableCheckpoint, RunHooks, StepDecay, TrainingConfig,
};

/// Summary of one `run_training` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Episodes of this run, in order
    pub episodes: Vec<Episode>,
    /// Steps taken during this run
    pub total_steps: usize,
    /// Exploration rate when the run finished
    pub exploration_rate: f64,
}

impl TrainingReport {
    /// Episodes that ended on a terminal cell
    #[must_use]
    pub fn goals_reached(&self) -> usize {
        self.episodes.iter().filter(|e| e.reached_goal()).count()
    }

    /// Fraction of episodes that ended on a terminal cell
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.goals_reached() as f64 / self.episodes.len() as f64
        }
    }

    /// Mean episode reward
    #[must_use]
    pub fn average_reward(&self) -> f64 {
        if self.episodes.is_empty() {
            0.0
        } else {
            let total: f64 = self.episodes.iter().map(|e| e.total_reward).sum();
            total / self.episodes.len() as f64
        }
    }
}

/// One training run over the grid world
pub struct TrainingSession<P = EpsilonGreedy> {
    pub(crate) config: TrainingConfig,
    pub(crate) q_table: QTable,
    pub(crate) exploration_rate: f64,
    pub(crate) schedule: StepDecay,
    pub(crate) policy: P,
    pub(crate) episodes_completed: usize,
    pub(crate) total_steps: usize,
}

impl TrainingSession<EpsilonGreedy> {
    /// Fresh session with an epsilon-greedy policy seeded from the config
    pub fn new(config: TrainingConfig) -> Result<Self> {
        let policy = EpsilonGreedy::new(config.seed);
        Self::with_policy(config, policy)
    }

    /// Continue from a saved table and exploration rate.
    ///
    /// The generator state is not saved, so a seeded run is re-seeded with
    /// `seed + total_steps` rather than replaying its first draws.
    pub fn resume(checkpoint: QTableCheckpoint) -> Result<Self> {
        let seed = checkpoint
            .config
            .seed
            .map(|seed| seed.wrapping_add(checkpoint.total_steps as u64));
        let mut session = Self::with_policy(checkpoint.config, EpsilonGreedy::new(seed))?;
        session.q_table = checkpoint.q_table;
        session.exploration_rate = checkpoint.exploration_rate;
        session.episodes_completed = checkpoint.episodes_trained;
        session.total_steps = checkpoint.total_steps;
        Ok(session)
    }
}

impl<P: Policy> TrainingSession<P> {
    /// Fresh session with a caller-supplied policy
    pub fn with_policy(config: TrainingConfig, policy: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            exploration_rate: config.exploration_start,
            schedule: StepDecay::new(config.exploration_decrement, config.exploration_floor),
            policy,
            episodes_completed: 0,
            total_steps: 0,
            config,
        })
    }

    /// Start from an existing table instead of zeros
    #[must_use]
    pub fn with_q_table(mut self, q_table: QTable) -> Self {
        self.q_table = q_table;
        self
    }

    /// Configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Learned values
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Current exploration rate
    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Episodes finished over the session's lifetime
    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Steps taken over the session's lifetime
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Run `config.episodes` episodes back to back
    pub async fn run_training<E: Environment>(
        &mut self,
        env: &mut E,
        hooks: &mut RunHooks<'_>,
    ) -> Result<TrainingReport> {
        info!(
            episodes = self.config.episodes,
            max_steps = self.config.max_steps,
            exploration_rate = self.exploration_rate,
            "starting training"
        );

        let steps_before = self.total_steps;
        let mut episodes = Vec::with_capacity(self.config.episodes);
        for _ in 0..self.config.episodes {
            episodes.push(self.run_episode(env, hooks).await?);
        }

        let report = TrainingReport {
            episodes,
            total_steps: self.total_steps - steps_before,
            exploration_rate: self.exploration_rate,
        };
        info!(
            episodes = report.episodes.len(),
            steps = report.total_steps,
            goals = report.goals_reached(),
            average_reward = report.average_reward(),
            exploration_rate = report.exploration_rate,
            "training finished"
        );
        Ok(report)
    }

    /// Train with no observer and no pacing
    pub async fn train_headless<E: Environment>(&mut self, env: &mut E) -> Result<TrainingReport> {
        let mut headless = Headless::new();
        self.run_training(env, &mut headless.hooks()).await
    }

    /// Walk the greedy policy from the start cell
    pub async fn run_playback<E: Environment>(
        &mut self,
        env: &mut E,
        hooks: &mut RunHooks<'_>,
    ) -> Result<PlaybackOutcome> {
        GreedyPlayback::new(self.config.playback_step_cap)
            .run(&mut self.q_table, env, hooks)
            .await
    }

    /// Capture the table for the host to persist
    pub fn checkpoint(&self) -> QTableCheckpoint {
        QTableCheckpoint::new(
            self.config.clone(),
            self.q_table.clone(),
            self.exploration_rate,
            self.episodes_completed,
            self.total_steps,
        )
    }
}
