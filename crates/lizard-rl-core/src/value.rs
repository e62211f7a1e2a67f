//! Tabular action-value store
//!
//! The table holds one row per grid cell and one column per [`Move`]. All
//! cells start at zero and the shape never changes.
//!
//! # Update rule
//!
//! [`QTable::update`] does not use textbook Q-learning. The learning target
//! is the reward accumulated over the *whole episode so far* plus the
//! discounted best value of the next state:
//!
//! ```text
//! Q[s][a] <- (1 - lr) * Q[s][a] + lr * (episode_reward + discount * max Q[s'])
//! ```
//!
//! Textbook Q-learning would use the immediate step reward in place of
//! `episode_reward`. Callers pass the running total, not the step reward.

use serde::{Deserialize, Serialize};

use crate::{Move, Position, Reward, StateIndex, NUM_STATES};

/// Blend between the old estimate and the new target
pub const LEARNING_RATE: f64 = 0.7;

/// Weight of the next state's best value in the target
pub const DISCOUNT: f64 = 0.99;

/// One row of action values
pub type ActionValues = [f64; Move::COUNT];

/// Action values for every cell of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    values: [ActionValues; NUM_STATES],
}

impl QTable {
    /// A table of zeros
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: [[0.0; Move::COUNT]; NUM_STATES],
        }
    }

    /// Build a table from explicit rows, indexed by state
    #[must_use]
    pub fn from_rows(values: [ActionValues; NUM_STATES]) -> Self {
        Self { values }
    }

    /// Q(state, action)
    #[must_use]
    pub fn value_of(&self, state: StateIndex, action: Move) -> f64 {
        self.values[state.get()][action.index()]
    }

    /// All four values of a state
    #[must_use]
    pub fn row(&self, state: StateIndex) -> &ActionValues {
        &self.values[state.get()]
    }

    /// Greedy action; the first column wins ties, so an all-equal row yields `Left`
    #[must_use]
    pub fn best_action(&self, state: StateIndex) -> Move {
        let row = self.row(state);
        let mut best = 0;
        for (i, value) in row.iter().enumerate().skip(1) {
            if *value > row[best] {
                best = i;
            }
        }
        Move::ALL[best]
    }

    /// Largest value in a state's row
    #[must_use]
    pub fn max_value(&self, state: StateIndex) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Apply the cumulative-reward update with the fixed rates. Returns the new value.
    pub fn update(
        &mut self,
        prev: StateIndex,
        action: Move,
        episode_reward: Reward,
        next: StateIndex,
    ) -> f64 {
        self.update_with(prev, action, episode_reward, next, LEARNING_RATE, DISCOUNT)
    }

    /// Apply the cumulative-reward update with explicit rates. Returns the new value.
    pub fn update_with(
        &mut self,
        prev: StateIndex,
        action: Move,
        episode_reward: Reward,
        next: StateIndex,
        learning_rate: f64,
        discount: f64,
    ) -> f64 {
        let old = self.value_of(prev, action);
        let target = episode_reward.value() + discount * self.max_value(next);
        let new = (1.0 - learning_rate) * old + learning_rate * target;
        self.values[prev.get()][action.index()] = new;
        new
    }

    /// Subtract `amount` from a single state/action value
    pub fn penalize(&mut self, state: StateIndex, action: Move, amount: f64) {
        self.values[state.get()][action.index()] -= amount;
    }

    /// Copy of the full 9x4 matrix, rows in state order
    #[must_use]
    pub fn snapshot(&self) -> [ActionValues; NUM_STATES] {
        self.values
    }

    /// Best move for every state
    #[must_use]
    pub fn greedy_policy(&self) -> [Move; NUM_STATES] {
        let mut policy = [Move::Left; NUM_STATES];
        for (slot, position) in policy.iter_mut().zip(Position::all()) {
            *slot = self.best_action(position.index());
        }
        policy
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn s(i: usize) -> StateIndex {
        StateIndex::new(i).unwrap()
    }

    #[test]
    fn test_fresh_table_is_zero() {
        let table = QTable::new();
        for i in 0..NUM_STATES {
            assert_eq!(table.row(s(i)), &[0.0; 4]);
            assert_eq!(table.max_value(s(i)), 0.0);
        }
    }

    #[test]
    fn test_ties_break_to_lowest_index() {
        let table = QTable::new();
        assert_eq!(table.best_action(s(6)), Move::Left);

        let mut rows = [[0.0; 4]; NUM_STATES];
        rows[3] = [1.0, 5.0, 5.0, 5.0];
        rows[4] = [-1.0, -1.0, 2.0, 2.0];
        let table = QTable::from_rows(rows);
        assert_eq!(table.best_action(s(3)), Move::Right);
        assert_eq!(table.best_action(s(4)), Move::Up);
    }

    #[test]
    fn test_max_value_handles_negative_rows() {
        let mut rows = [[0.0; 4]; NUM_STATES];
        rows[0] = [-3.0, -7.0, -1.5, -2.0];
        assert_eq!(QTable::from_rows(rows).max_value(s(0)), -1.5);
    }

    #[test]
    fn test_update_uses_cumulative_reward() {
        let mut rows = [[0.0; 4]; NUM_STATES];
        rows[7] = [4.0, 0.0, 0.0, 0.0];
        rows[6][1] = 2.0;
        let mut table = QTable::from_rows(rows);

        // (1 - 0.7) * 2 + 0.7 * (-2 + 0.99 * 4)
        let new = table.update(s(6), Move::Right, Reward(-2.0), s(7));
        assert_relative_eq!(new, 0.3 * 2.0 + 0.7 * (-2.0 + 0.99 * 4.0), epsilon = 1e-12);
        assert_relative_eq!(table.value_of(s(6), Move::Right), new);
    }

    #[test]
    fn test_update_from_zero_to_goal() {
        let mut table = QTable::new();
        let new = table.update(s(5), Move::Down, Reward(10.0), s(8));
        assert_relative_eq!(new, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_penalize_touches_one_cell() {
        let mut table = QTable::new();
        table.penalize(s(6), Move::Left, 100.0);
        assert_eq!(table.row(s(6)), &[-100.0, 0.0, 0.0, 0.0]);
        assert_eq!(table.best_action(s(6)), Move::Right);
    }

    #[test]
    fn test_greedy_policy_reads_each_row() {
        let mut rows = [[0.0; 4]; NUM_STATES];
        rows[6] = [0.0, 0.0, 0.0, 1.0];
        let policy = QTable::from_rows(rows).greedy_policy();
        assert_eq!(policy[6], Move::Down);
        assert_eq!(policy[0], Move::Left);
    }
}
