//! Grid positions and tabular state indices

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Move, RLError};

/// Width and height of the grid
pub const GRID_SIZE: usize = 3;

/// Number of cells, and so rows of the Q-table
pub const NUM_STATES: usize = GRID_SIZE * GRID_SIZE;

/// Where every episode and every playback begins: bottom-left
pub const START: Position = Position { x: 0, y: 2 };

/// A cell of the grid, `0 <= x, y <= 2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    x: usize,
    y: usize,
}

/// Unchecked wire form of a [`Position`]
#[derive(Deserialize)]
struct RawPosition {
    x: usize,
    y: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = RLError;

    fn try_from(raw: RawPosition) -> crate::Result<Self> {
        Self::new(raw.x, raw.y)
    }
}

impl Position {
    /// Create a position, rejecting coordinates outside the grid
    pub fn new(x: usize, y: usize) -> crate::Result<Self> {
        if Self::in_bounds(x as i64, y as i64) {
            Ok(Self { x, y })
        } else {
            Err(RLError::OutOfBounds {
                x: x as i64,
                y: y as i64,
            })
        }
    }

    /// Whether a signed coordinate pair lies on the grid
    #[must_use]
    pub fn in_bounds(x: i64, y: i64) -> bool {
        let size = GRID_SIZE as i64;
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Column
    #[must_use]
    pub fn x(self) -> usize {
        self.x
    }

    /// Row
    #[must_use]
    pub fn y(self) -> usize {
        self.y
    }

    /// Row-major state index `y * 3 + x`
    #[must_use]
    pub fn index(self) -> StateIndex {
        StateIndex(self.y * GRID_SIZE + self.x)
    }

    /// The neighbouring cell in the direction of `mv`, or `None` off the edge
    #[must_use]
    pub fn offset(self, mv: Move) -> Option<Self> {
        let (dx, dy) = mv.delta();
        let x = usize::try_from(self.x as i64 + dx).ok()?;
        let y = usize::try_from(self.y as i64 + dy).ok()?;
        (x < GRID_SIZE && y < GRID_SIZE).then_some(Self { x, y })
    }

    /// All cells in state-index order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..NUM_STATES).map(|i| StateIndex(i).position())
    }
}

impl Default for Position {
    fn default() -> Self {
        START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row of the Q-table, `0..9`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize")]
pub struct StateIndex(usize);

impl TryFrom<usize> for StateIndex {
    type Error = RLError;

    fn try_from(index: usize) -> crate::Result<Self> {
        Self::new(index)
    }
}

impl StateIndex {
    /// Create a state index, rejecting values past the last cell
    pub fn new(index: usize) -> crate::Result<Self> {
        if index < NUM_STATES {
            Ok(Self(index))
        } else {
            Err(RLError::OutOfBounds {
                x: (index % GRID_SIZE) as i64,
                y: (index / GRID_SIZE) as i64,
            })
        }
    }

    /// The raw row number
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    /// The cell this index names
    #[must_use]
    pub fn position(self) -> Position {
        Position {
            x: self.0 % GRID_SIZE,
            y: self.0 / GRID_SIZE,
        }
    }
}

impl From<Position> for StateIndex {
    fn from(position: Position) -> Self {
        position.index()
    }
}

impl fmt::Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}
