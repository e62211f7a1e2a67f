//! Static board description and the move transition

use serde::{Deserialize, Serialize};

use lizard_rl_core::{Move, Position, Reward, GRID_SIZE};

/// What sits on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// A single cricket, +1
    Cricket,
    /// Nothing, -1
    Empty,
    /// The bird, -10, terminal
    Bird,
    /// Five crickets, +10, terminal
    FiveCrickets,
}

impl Cell {
    /// Reward for landing here
    #[must_use]
    pub fn reward(self) -> Reward {
        match self {
            Cell::Cricket => Reward(1.0),
            Cell::Empty => Reward(-1.0),
            Cell::Bird => Reward(-10.0),
            Cell::FiveCrickets => Reward(10.0),
        }
    }

    /// Whether landing here ends the episode
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Cell::Bird | Cell::FiveCrickets)
    }
}

const LAYOUT: [[Cell; GRID_SIZE]; GRID_SIZE] = [
    [Cell::Cricket, Cell::Empty, Cell::Empty],
    [Cell::Empty, Cell::Bird, Cell::Empty],
    [Cell::Empty, Cell::Empty, Cell::FiveCrickets],
];

/// Outcome of attempting a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Resulting cell; unchanged when blocked
    pub position: Position,
    /// Reward of the landing cell, zero when blocked
    pub reward: Reward,
    /// False when the move would leave the grid
    pub moved: bool,
}

/// Fixed reward table and terminal set, indexed `[y][x]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridModel {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
}

impl GridModel {
    /// The one board this crate knows
    #[must_use]
    pub fn new() -> Self {
        Self { cells: LAYOUT }
    }

    /// Contents of a cell
    #[must_use]
    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.y()][pos.x()]
    }

    /// Reward for landing on `pos`
    #[must_use]
    pub fn reward_at(&self, pos: Position) -> Reward {
        self.cell(pos).reward()
    }

    /// Whether arriving on `pos` ends an episode
    #[must_use]
    pub fn is_terminal(&self, pos: Position) -> bool {
        self.cell(pos).is_terminal()
    }

    /// Whether a signed coordinate pair lies on the board
    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        Position::in_bounds(x, y)
    }

    /// Terminal cells in state-index order: the bird, then the crickets
    pub fn terminals(&self) -> impl Iterator<Item = Position> + '_ {
        Position::all().filter(|p| self.is_terminal(*p))
    }

    /// Apply `mv` at `pos`. A move off the edge is a no-op with no reward.
    #[must_use]
    pub fn attempt_move(&self, pos: Position, mv: Move) -> Transition {
        match pos.offset(mv) {
            Some(next) => Transition {
                position: next,
                reward: self.reward_at(next),
                moved: true,
            },
            None => Transition {
                position: pos,
                reward: Reward::ZERO,
                moved: false,
            },
        }
    }
}

impl Default for GridModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_reward_table() {
        let grid = GridModel::new();
        let expected = [[1.0, -1.0, -1.0], [-1.0, -10.0, -1.0], [-1.0, -1.0, 10.0]];
        for (y, row) in expected.iter().enumerate() {
            for (x, reward) in row.iter().enumerate() {
                assert_eq!(grid.reward_at(p(x, y)), Reward(*reward), "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_terminals() {
        let grid = GridModel::new();
        let terminals: Vec<_> = grid.terminals().collect();
        assert_eq!(terminals, vec![p(1, 1), p(2, 2)]);
        assert!(!grid.is_terminal(p(0, 2)));
    }

    #[test]
    fn test_named_moves() {
        let grid = GridModel::new();

        let into_bird = grid.attempt_move(p(1, 2), Move::Up);
        assert_eq!(into_bird.position, p(1, 1));
        assert_eq!(into_bird.reward, Reward(-10.0));
        assert!(into_bird.moved);

        let into_goal = grid.attempt_move(p(2, 1), Move::Down);
        assert_eq!(into_goal.reward, Reward(10.0));

        let top_right = grid.attempt_move(p(1, 0), Move::Right);
        assert_eq!(top_right.position, p(2, 0));
        assert_eq!(top_right.reward, Reward(-1.0));
    }

    #[test]
    fn test_blocked_move_is_noop() {
        let grid = GridModel::new();
        let blocked = grid.attempt_move(p(0, 2), Move::Down);
        assert_eq!(
            blocked,
            Transition {
                position: p(0, 2),
                reward: Reward::ZERO,
                moved: false,
            }
        );
    }

    #[test]
    fn test_in_bounds() {
        let grid = GridModel::new();
        assert!(grid.in_bounds(0, 0));
        assert!(grid.in_bounds(2, 2));
        assert!(!grid.in_bounds(-1, 1));
        assert!(!grid.in_bounds(1, 3));
    }
}
