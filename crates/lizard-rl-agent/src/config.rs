//! Training configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use lizard_rl_core::{RLError, Result, DISCOUNT, LEARNING_RATE};

/// Hyperparameters and run limits for a training session.
///
/// Every field has a default, so a JSON file may name only the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Episodes per training run
    pub episodes: usize,
    /// Step budget of one episode
    pub max_steps: usize,
    /// Blend between old estimate and target
    pub learning_rate: f64,
    /// Weight of the next state's best value
    pub discount: f64,
    /// Exploration rate at the start of the run
    pub exploration_start: f64,
    /// Subtracted from the exploration rate after every step
    pub exploration_decrement: f64,
    /// The exploration rate never decays below this
    pub exploration_floor: f64,
    /// Pause between training steps, 0 for headless runs
    pub step_delay_ms: u64,
    /// Pause between playback moves
    pub playback_delay_ms: u64,
    /// Playback gives up after this many iterations
    pub playback_step_cap: usize,
    /// Seed for the exploration generator
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            max_steps: 100,
            learning_rate: LEARNING_RATE,
            discount: DISCOUNT,
            exploration_start: 1.0,
            exploration_decrement: 0.005,
            exploration_floor: 0.2,
            step_delay_ms: 0,
            playback_delay_ms: 0,
            playback_step_cap: 100,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Reject values the learning loop cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RLError::InvalidConfig(msg));

        if self.episodes == 0 {
            return invalid("episodes must be at least 1".into());
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be at least 1".into());
        }
        if self.playback_step_cap == 0 {
            return invalid("playback_step_cap must be at least 1".into());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return invalid(format!("learning_rate {} not in (0, 1]", self.learning_rate));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return invalid(format!("discount {} not in [0, 1]", self.discount));
        }
        if !(0.0..=1.0).contains(&self.exploration_start)
            || !(0.0..=1.0).contains(&self.exploration_floor)
        {
            return invalid("exploration rates must lie in [0, 1]".into());
        }
        if self.exploration_floor > self.exploration_start {
            return invalid(format!(
                "exploration_floor {} above exploration_start {}",
                self.exploration_floor, self.exploration_start
            ));
        }
        if !(self.exploration_decrement >= 0.0) {
            return invalid(format!(
                "exploration_decrement {} is negative",
                self.exploration_decrement
            ));
        }
        Ok(())
    }

    /// Read a JSON config file and validate it
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Pause between training steps
    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Pause between playback moves
    #[must_use]
    pub fn playback_delay(&self) -> Duration {
        Duration::from_millis(self.playback_delay_ms)
    }
}
