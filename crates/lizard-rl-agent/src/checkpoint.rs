//! Saving and loading learned tables
//!
//! Nothing is persisted unless the host asks; a checkpoint is a pretty JSON
//! file holding the table, the exploration rate and the config it was
//! trained with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use lizard_rl_core::{QTable, Result};

use crate::TrainingConfig;

/// A learned table plus enough context to resume training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableCheckpoint {
    /// Checkpoint ID
    pub id: Uuid,
    /// When the checkpoint was taken
    pub created_at: DateTime<Utc>,
    /// Episodes finished before the checkpoint
    pub episodes_trained: usize,
    /// Steps taken before the checkpoint
    pub total_steps: usize,
    /// Exploration rate to resume from
    pub exploration_rate: f64,
    /// Config of the session that produced the table
    pub config: TrainingConfig,
    /// The learned values
    pub q_table: QTable,
}

impl QTableCheckpoint {
    /// Stamp a new checkpoint
    #[must_use]
    pub fn new(
        config: TrainingConfig,
        q_table: QTable,
        exploration_rate: f64,
        episodes_trained: usize,
        total_steps: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            episodes_trained,
            total_steps,
            exploration_rate,
            config,
            q_table,
        }
    }

    /// Write as pretty JSON, creating parent directories
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        info!(id = %self.id, path = %path.display(), "saved checkpoint");
        Ok(())
    }

    /// Read a checkpoint written by [`save`](Self::save)
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        let checkpoint: Self = serde_json::from_str(&json)?;
        checkpoint.config.validate()?;
        info!(
            id = %checkpoint.id,
            episodes = checkpoint.episodes_trained,
            "loaded checkpoint"
        );
        Ok(checkpoint)
    }
}
