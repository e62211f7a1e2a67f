//! The episode state machine
//!
//! ```text
//! Running --(terminal cell)--> TerminatedByGoal
//!    |  ^
//!    |  +-- step
//!    +-----(step budget spent)--> TerminatedByStepLimit
//! ```
//!
//! The termination check runs before each step, the goal check first.

use tracing::{debug, info};

use lizard_rl_core::{
    Environment, Episode, EpisodeOutcome, Move, Policy, Result, Reward, Step,
};

use crate::{Phase, RunHooks, Snapshot, TrainingSession};

const LOG_INTERVAL: usize = 10;

/// Where an episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// More steps to take
    Running,
    /// The lizard stands on a terminal cell
    TerminatedByGoal,
    /// The step budget is spent
    TerminatedByStepLimit,
}

/// Counters that reset with every episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeProgress {
    /// Index of the episode within the session
    pub index: usize,
    /// Steps taken so far
    pub step_count: usize,
    /// Reward of every accepted move so far
    pub cumulative_reward: Reward,
}

impl EpisodeProgress {
    /// Counters at zero
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            step_count: 0,
            cumulative_reward: Reward::ZERO,
        }
    }
}

/// What one training step did
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Chosen move
    pub action: Move,
    /// Environment result
    pub step: Step,
    /// Q-value written for the previous state and the chosen move
    pub new_value: f64,
    /// State after the step
    pub snapshot: Snapshot,
}

impl<P: Policy> TrainingSession<P> {
    /// Evaluate the termination check for the current position
    pub fn status<E: Environment>(&self, env: &E, progress: &EpisodeProgress) -> EpisodeStatus {
        if env.is_terminal(env.position()) {
            EpisodeStatus::TerminatedByGoal
        } else if progress.step_count >= self.config.max_steps {
            EpisodeStatus::TerminatedByStepLimit
        } else {
            EpisodeStatus::Running
        }
    }

    /// Take one step: select, move, learn, decay.
    ///
    /// A blocked move still counts as a step and still updates the table,
    /// with the unchanged cell as both the previous and the next state.
    pub async fn step<E: Environment>(
        &mut self,
        env: &mut E,
        progress: &mut EpisodeProgress,
    ) -> Result<StepReport> {
        let prev = env.position().index();
        let action = self.policy.select(prev, &self.q_table, self.exploration_rate);

        let step = env.step(action).await?;
        if step.moved {
            progress.cumulative_reward += step.reward;
        }

        let next = step.position.index();
        let new_value = self.q_table.update_with(
            prev,
            action,
            progress.cumulative_reward,
            next,
            self.config.learning_rate,
            self.config.discount,
        );

        progress.step_count += 1;
        self.total_steps += 1;
        self.exploration_rate = self.schedule.next(self.exploration_rate);

        let snapshot = self.snapshot(Phase::Training, progress, step.position, Some(action));
        Ok(StepReport {
            action,
            step,
            new_value,
            snapshot,
        })
    }

    /// Run one episode to termination, then put the lizard back on the start cell
    pub async fn run_episode<E: Environment>(
        &mut self,
        env: &mut E,
        hooks: &mut RunHooks<'_>,
    ) -> Result<Episode> {
        let index = self.episodes_completed;
        let mut record = Episode::begin(index);
        let mut progress = EpisodeProgress::new(index);
        env.reset().await?;

        let outcome = loop {
            match self.status(env, &progress) {
                EpisodeStatus::Running => {}
                EpisodeStatus::TerminatedByGoal => {
                    break EpisodeOutcome::Goal {
                        cell: env.position(),
                    }
                }
                EpisodeStatus::TerminatedByStepLimit => break EpisodeOutcome::StepLimit,
            }

            hooks.cancel.check()?;
            let report = self.step(env, &mut progress).await?;
            hooks.observer.on_snapshot(&report.snapshot).await;
            hooks.pacer.pause().await;
        };

        record.finish(outcome, progress.step_count, progress.cumulative_reward);
        self.episodes_completed += 1;

        let start = env.reset().await?;
        let reset = EpisodeProgress::new(index);
        let snapshot = self.snapshot(Phase::EpisodeReset, &reset, start, None);
        hooks.observer.on_snapshot(&snapshot).await;

        debug!(
            episode = index,
            steps = record.steps,
            reward = record.total_reward,
            outcome = ?outcome,
            "episode finished"
        );
        if (index + 1) % LOG_INTERVAL == 0 {
            info!(
                episode = index + 1,
                exploration_rate = self.exploration_rate,
                "training progress"
            );
        }
        Ok(record)
    }

    pub(crate) fn snapshot(
        &self,
        phase: Phase,
        progress: &EpisodeProgress,
        position: lizard_rl_core::Position,
        action: Option<Move>,
    ) -> Snapshot {
        Snapshot {
            phase,
            episode: progress.index,
            step: progress.step_count,
            position,
            action,
            cumulative_reward: progress.cumulative_reward,
            exploration_rate: self.exploration_rate,
            q_table: self.q_table.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoPacing, RecordingObserver, TrainingConfig};
    use approx::assert_relative_eq;
    use lizard_rl_core::{Greedy, Position, QTable, StateIndex, START};
    use lizard_rl_env::LizardEnv;

    /// Plays a fixed list of moves, repeating the last one
    struct Scripted(Vec<Move>, usize);

    impl Policy for Scripted {
        fn select(&mut self, _: StateIndex, _: &QTable, _: f64) -> Move {
            let mv = self.0[self.1.min(self.0.len() - 1)];
            self.1 += 1;
            mv
        }
    }

    fn scripted(moves: &[Move]) -> TrainingSession<Scripted> {
        TrainingSession::with_policy(TrainingConfig::default(), Scripted(moves.to_vec(), 0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_blocked_step_updates_with_same_state() {
        let mut rows = [[0.0; 4]; 9];
        rows[6] = [0.0, 2.0, 0.0, 0.0];
        let mut session = scripted(&[Move::Left]).with_q_table(QTable::from_rows(rows));
        let mut env = LizardEnv::new();
        let mut progress = EpisodeProgress::new(0);

        let report = session.step(&mut env, &mut progress).await.unwrap();
        assert!(!report.step.moved);
        assert_eq!(progress.step_count, 1);
        assert_eq!(progress.cumulative_reward, Reward::ZERO);
        // 0.3 * 0 + 0.7 * (0 + 0.99 * 2)
        assert_relative_eq!(report.new_value, 1.386, epsilon = 1e-12);
        assert_relative_eq!(session.q_table().value_of(START.index(), Move::Left), 1.386);
        assert_relative_eq!(session.exploration_rate(), 0.995);
    }

    #[tokio::test]
    async fn test_scripted_route_reaches_goal() {
        use Move::{Down, Right, Up};
        let mut session = scripted(&[Up, Up, Right, Right, Down, Down]);
        let mut env = LizardEnv::new();
        let mut observer = RecordingObserver::new();
        let mut pacer = NoPacing;
        let mut hooks = RunHooks::new(&mut observer, &mut pacer);

        let episode = session.run_episode(&mut env, &mut hooks).await.unwrap();
        assert_eq!(
            episode.outcome,
            Some(EpisodeOutcome::Goal {
                cell: Position::new(2, 2).unwrap()
            })
        );
        assert_eq!(episode.steps, 6);
        // -1 +1 -1 -1 -1 +10
        assert_eq!(episode.total_reward, 7.0);
        assert_eq!(env.position(), START);
        assert_relative_eq!(session.exploration_rate(), 0.97, epsilon = 1e-12);

        assert_eq!(observer.of_phase(Phase::Training).count(), 6);
        let reset = observer.snapshots.last().unwrap();
        assert_eq!(reset.phase, Phase::EpisodeReset);
        assert_eq!(reset.position, START);
        assert_eq!(reset.step, 0);
        assert_eq!(reset.cumulative_reward, Reward::ZERO);
    }

    #[tokio::test]
    async fn test_update_target_is_running_total() {
        use Move::Up;
        let mut session = scripted(&[Up, Up]);
        let mut env = LizardEnv::new();
        let mut progress = EpisodeProgress::new(0);

        // (0,2) -> (0,1): total -1
        let first = session.step(&mut env, &mut progress).await.unwrap();
        assert_relative_eq!(first.new_value, 0.7 * -1.0);
        // (0,1) -> (0,0): total 0, max Q(0,0) = 0
        let second = session.step(&mut env, &mut progress).await.unwrap();
        assert_relative_eq!(second.new_value, 0.0);
        assert_eq!(progress.cumulative_reward, Reward::ZERO);
    }

    #[tokio::test]
    async fn test_avoiding_policy_hits_step_limit() {
        // All zeros: greedy keeps choosing LEFT at (0, 2), which is blocked
        let config = TrainingConfig {
            exploration_start: 0.0,
            exploration_floor: 0.0,
            ..Default::default()
        };
        let mut session = TrainingSession::with_policy(config, Greedy).unwrap();
        let mut env = LizardEnv::new();
        let mut observer = RecordingObserver::new();
        let mut pacer = NoPacing;
        let mut hooks = RunHooks::new(&mut observer, &mut pacer);

        let episode = session.run_episode(&mut env, &mut hooks).await.unwrap();
        assert_eq!(episode.outcome, Some(EpisodeOutcome::StepLimit));
        assert_eq!(episode.steps, 100);
        assert_eq!(session.total_steps(), 100);

        let steps: Vec<_> = observer.of_phase(Phase::Training).map(|s| s.step).collect();
        assert_eq!(steps, (1..=100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_status_checks_goal_before_budget() {
        let session = scripted(&[Move::Up]);
        let mut env = LizardEnv::new();
        let mut progress = EpisodeProgress::new(0);
        assert_eq!(session.status(&env, &progress), EpisodeStatus::Running);

        progress.step_count = 100;
        assert_eq!(
            session.status(&env, &progress),
            EpisodeStatus::TerminatedByStepLimit
        );

        env.step(Move::Right).await.unwrap();
        env.step(Move::Up).await.unwrap();
        assert_eq!(session.status(&env, &progress), EpisodeStatus::TerminatedByGoal);
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_step() {
        let mut session = scripted(&[Move::Left]);
        let mut env = LizardEnv::new();
        let mut observer = RecordingObserver::new();
        let mut pacer = NoPacing;
        let mut hooks = RunHooks::new(&mut observer, &mut pacer);
        hooks.cancel.cancel();

        let result = session.run_episode(&mut env, &mut hooks).await;
        assert!(matches!(result, Err(lizard_rl_core::RLError::Cancelled)));
        assert_eq!(session.total_steps(), 0);
        assert_eq!(session.episodes_completed(), 0);
    }
}
