//! The four moves and the discrete move space

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for defining action spaces
pub trait ActionSpace: Send + Sync {
    /// The type of actions in this space
    type Action;

    /// Sample an action uniformly from the space
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Action;

    /// Number of actions in the space
    fn len(&self) -> usize;
}

/// A single move of the agent.
///
/// The discriminant is the column of the move in the Q-table, so the
/// declaration order is also the tie-break priority of greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    /// (-1, 0)
    Left = 0,
    /// (+1, 0)
    Right = 1,
    /// (0, -1)
    Up = 2,
    /// (0, +1)
    Down = 3,
}

impl Move {
    /// Number of moves
    pub const COUNT: usize = 4;

    /// Every move, in Q-table column order
    pub const ALL: [Move; Move::COUNT] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// Column index of this move in the Q-table
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a move by its column index
    pub fn from_index(index: usize) -> crate::Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| crate::RLError::InvalidAction(format!("move index {index} (expected 0..4)")))
    }

    /// Coordinate delta `(dx, dy)`; `y` grows downwards
    #[must_use]
    pub fn delta(self) -> (i64, i64) {
        match self {
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
            Move::Up => (0, -1),
            Move::Down => (0, 1),
        }
    }

    /// Arrow glyph used by text renderers
    #[must_use]
    pub fn arrow(self) -> char {
        match self {
            Move::Left => '←',
            Move::Right => '→',
            Move::Up => '↑',
            Move::Down => '↓',
        }
    }
}

impl TryFrom<usize> for Move {
    type Error = crate::RLError;

    fn try_from(index: usize) -> crate::Result<Self> {
        Self::from_index(index)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
            Move::Up => "UP",
            Move::Down => "DOWN",
        };
        f.write_str(name)
    }
}

/// The space of the four moves
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveSpace;

impl ActionSpace for MoveSpace {
    type Action = Move;

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        Move::ALL[rng.gen_range(0..Move::COUNT)]
    }

    fn len(&self) -> usize {
        Move::COUNT
    }
}
