//! The grid world as an [`Environment`]

use async_trait::async_trait;
use tracing::{debug, trace};

use lizard_rl_core::{Environment, Move, Position, Result, Step, START};

use crate::GridModel;

/// A lizard walking on the [`GridModel`]
#[derive(Debug, Clone, Default)]
pub struct LizardEnv {
    grid: GridModel,
    position: Position,
}

impl LizardEnv {
    /// A lizard on the start cell
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: GridModel::new(),
            position: START,
        }
    }

    /// The board
    #[must_use]
    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    /// Would `mv` leave the grid from the current cell
    #[must_use]
    pub fn is_blocked(&self, mv: Move) -> bool {
        self.position.offset(mv).is_none()
    }
}

#[async_trait]
impl Environment for LizardEnv {
    async fn reset(&mut self) -> Result<Position> {
        self.position = START;
        trace!(position = %self.position, "reset");
        Ok(self.position)
    }

    async fn step(&mut self, action: Move) -> Result<Step> {
        let previous = self.position;
        let transition = self.grid.attempt_move(previous, action);
        self.position = transition.position;

        let done = self.grid.is_terminal(self.position);
        debug!(
            from = %previous,
            to = %self.position,
            action = %action,
            reward = transition.reward.value(),
            moved = transition.moved,
            done,
            "step"
        );

        Ok(Step {
            previous,
            position: self.position,
            reward: transition.reward,
            moved: transition.moved,
            done,
        })
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_terminal(&self, position: Position) -> bool {
        self.grid.is_terminal(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lizard_rl_core::Reward;

    #[tokio::test]
    async fn test_walk_to_goal() {
        let mut env = LizardEnv::new();
        assert_eq!(env.reset().await.unwrap(), START);

        let step = env.step(Move::Right).await.unwrap();
        assert_eq!(step.reward, Reward(-1.0));
        assert!(!step.done);
        let step = env.step(Move::Right).await.unwrap();
        assert!(step.done);
        assert_eq!(step.position, Position::new(2, 2).unwrap());
        assert_eq!(step.reward, Reward(10.0));
    }

    #[tokio::test]
    async fn test_blocked_step_keeps_position() {
        let mut env = LizardEnv::new();
        env.reset().await.unwrap();
        assert!(env.is_blocked(Move::Left));

        let step = env.step(Move::Left).await.unwrap();
        assert!(!step.moved);
        assert_eq!(step.previous, step.position);
        assert_eq!(step.reward, Reward::ZERO);
        assert_eq!(env.position(), START);
    }
}
