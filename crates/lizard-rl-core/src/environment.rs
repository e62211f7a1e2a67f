//! Environment trait and episode bookkeeping

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Move, Position, Reward};

/// Result of a single environment step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Cell before the move
    pub previous: Position,
    /// Cell after the move; equal to `previous` when blocked
    pub position: Position,
    /// Reward of the landing cell, zero when blocked
    pub reward: Reward,
    /// False when the move would have left the grid
    pub moved: bool,
    /// Whether the new cell ends the episode
    pub done: bool,
}

/// Core environment trait
#[async_trait]
pub trait Environment: Send + Sync {
    /// Put the agent back on the start cell
    async fn reset(&mut self) -> crate::Result<Position>;

    /// Attempt one move
    async fn step(&mut self, action: Move) -> crate::Result<Step>;

    /// Current cell of the agent
    fn position(&self) -> Position;

    /// Whether arriving on `position` ends an episode
    fn is_terminal(&self, position: Position) -> bool;
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// A terminal cell was reached
    Goal {
        /// The terminal cell
        cell: Position,
    },
    /// The step budget ran out first
    StepLimit,
}

/// Episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: String,
    /// Position of the episode within its training run
    pub index: usize,
    /// Reward accumulated over the episode
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// How it ended, `None` while running
    pub outcome: Option<EpisodeOutcome>,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// End time
    pub end_time: Option<DateTime<Utc>>,
}

impl Episode {
    /// Open a new episode record
    #[must_use]
    pub fn begin(index: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            index,
            total_reward: 0.0,
            steps: 0,
            outcome: None,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    /// Close the record
    pub fn finish(&mut self, outcome: EpisodeOutcome, steps: usize, total_reward: Reward) {
        self.outcome = Some(outcome);
        self.steps = steps;
        self.total_reward = total_reward.value();
        self.end_time = Some(Utc::now());
    }

    /// Whether the episode has ended
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether the episode ended on a terminal cell
    #[must_use]
    pub fn reached_goal(&self) -> bool {
        matches!(self.outcome, Some(EpisodeOutcome::Goal { .. }))
    }
}
