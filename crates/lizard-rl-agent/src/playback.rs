//! Greedy playback of a learned table
//!
//! Playback starts on the start cell and always takes the best-known move.
//! A best move that points off the grid would be picked forever, so every
//! blocked attempt costs that state/move pair [`BOUNDARY_PENALTY`] and the
//! lizard stays put. A table can still send the lizard around a cycle that
//! never touches a terminal cell; the step cap ends those runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lizard_rl_core::{Environment, Position, QTable, Result, Reward};

use crate::{Phase, RunHooks, Snapshot};

/// Subtracted from a Q-value whose greedy move was blocked
pub const BOUNDARY_PENALTY: f64 = 100.0;

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// Stopped on a terminal cell
    ReachedTerminal {
        /// The terminal cell
        cell: Position,
        /// Iterations taken, blocked ones included
        steps: usize,
        /// Blocked moves that were penalized
        penalties: usize,
    },
    /// Gave up; the table is likely undertrained
    StepCapExceeded {
        /// Iterations taken
        steps: usize,
        /// Cell the lizard was left on
        position: Position,
    },
}

impl PlaybackOutcome {
    /// Whether a terminal cell was reached
    #[must_use]
    pub fn reached_terminal(&self) -> bool {
        matches!(self, Self::ReachedTerminal { .. })
    }
}

/// Greedy walk with an iteration cap
#[derive(Debug, Clone, Copy)]
pub struct GreedyPlayback {
    step_cap: usize,
}

impl GreedyPlayback {
    /// Playback giving up after `step_cap` iterations
    #[must_use]
    pub fn new(step_cap: usize) -> Self {
        Self { step_cap }
    }

    /// Walk from the start cell until a terminal cell or the cap
    pub async fn run<E: Environment>(
        &self,
        table: &mut QTable,
        env: &mut E,
        hooks: &mut RunHooks<'_>,
    ) -> Result<PlaybackOutcome> {
        let mut position = env.reset().await?;
        let mut steps = 0;
        let mut penalties = 0;
        let mut total = Reward::ZERO;
        hooks
            .observer
            .on_snapshot(&Self::snapshot(table, position, steps, None, total))
            .await;

        info!(start = %position, cap = self.step_cap, "starting greedy playback");
        loop {
            if env.is_terminal(position) {
                info!(cell = %position, steps, penalties, reward = total.value(), "playback reached terminal cell");
                return Ok(PlaybackOutcome::ReachedTerminal {
                    cell: position,
                    steps,
                    penalties,
                });
            }
            if steps >= self.step_cap {
                warn!(
                    steps,
                    position = %position,
                    "playback hit its step cap without reaching a terminal cell; policy looks undertrained"
                );
                return Ok(PlaybackOutcome::StepCapExceeded { steps, position });
            }
            hooks.cancel.check()?;

            let state = position.index();
            let action = table.best_action(state);
            let step = env.step(action).await?;
            if step.moved {
                total += step.reward;
            } else {
                table.penalize(state, action, BOUNDARY_PENALTY);
                penalties += 1;
                debug!(%state, %action, "blocked greedy move penalized");
            }
            position = step.position;
            steps += 1;

            hooks
                .observer
                .on_snapshot(&Self::snapshot(table, position, steps, Some(action), total))
                .await;
            hooks.pacer.pause().await;
        }
    }

    fn snapshot(
        table: &QTable,
        position: Position,
        step: usize,
        action: Option<lizard_rl_core::Move>,
        total: Reward,
    ) -> Snapshot {
        Snapshot {
            phase: Phase::Playback,
            episode: 0,
            step,
            position,
            action,
            cumulative_reward: total,
            exploration_rate: 0.0,
            q_table: table.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoPacing, NullObserver, RecordingObserver};
    use lizard_rl_core::{Move, START};
    use lizard_rl_env::LizardEnv;

    #[tokio::test]
    async fn test_follows_best_moves_to_goal() {
        let mut rows = [[0.0; 4]; 9];
        rows[6] = [0.0, 5.0, 0.0, 0.0];
        rows[7] = [0.0, 9.0, 0.0, 0.0];
        let mut table = QTable::from_rows(rows);
        let mut env = LizardEnv::new();
        let mut observer = RecordingObserver::new();
        let mut pacer = NoPacing;
        let mut hooks = RunHooks::new(&mut observer, &mut pacer);

        let outcome = GreedyPlayback::new(100)
            .run(&mut table, &mut env, &mut hooks)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PlaybackOutcome::ReachedTerminal {
                cell: Position::new(2, 2).unwrap(),
                steps: 2,
                penalties: 0,
            }
        );
        // start frame plus one per move
        assert_eq!(observer.snapshots.len(), 3);
        assert_eq!(observer.snapshots[2].cumulative_reward, Reward(9.0));
    }

    #[tokio::test]
    async fn test_blocked_best_move_is_penalized_once() {
        let mut rows = [[0.0; 4]; 9];
        rows[6] = [0.0, 1.0, 0.0, 3.0];
        rows[7] = [0.0, 2.0, 0.0, 0.0];
        let mut table = QTable::from_rows(rows);
        let mut env = LizardEnv::new();
        let (mut observer, mut pacer) = (NullObserver, NoPacing);
        let mut hooks = RunHooks::new(&mut observer, &mut pacer);

        let outcome = GreedyPlayback::new(100)
            .run(&mut table, &mut env, &mut hooks)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PlaybackOutcome::ReachedTerminal {
                cell: Position::new(2, 2).unwrap(),
                steps: 3,
                penalties: 1,
            }
        );
        assert_eq!(table.value_of(START.index(), Move::Down), 3.0 - BOUNDARY_PENALTY);
        assert_eq!(table.value_of(START.index(), Move::Right), 1.0);
    }

    #[tokio::test]
    async fn test_untrained_table_hits_cap() {
        // Zeros: LEFT is blocked at (0, 2) and penalized, then the lizard
        // shuttles between (0, 2) and (1, 2) forever
        let mut table = QTable::new();
        let mut env = LizardEnv::new();
        let (mut observer, mut pacer) = (NullObserver, NoPacing);
        let mut hooks = RunHooks::new(&mut observer, &mut pacer);

        let outcome = GreedyPlayback::new(25)
            .run(&mut table, &mut env, &mut hooks)
            .await
            .unwrap();
        assert!(!outcome.reached_terminal());
        assert!(matches!(
            outcome,
            PlaybackOutcome::StepCapExceeded { steps: 25, .. }
        ));
        assert_eq!(table.value_of(START.index(), Move::Left), -BOUNDARY_PENALTY);
    }
}
