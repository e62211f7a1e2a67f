//! The lizard grid world
//!
//! A 3x3 board the agent (a lizard) walks on. Landing on a cell pays its
//! reward; the bird and the five-cricket pile end the episode.
//!
//! ```text
//!   +1   -1   -1      1 cricket | empty  | empty
//!   -1  -10   -1      empty     | bird   | empty
//!   -1   -1  +10      start     | empty  | 5 crickets
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod lizard;

pub use grid::{Cell, GridModel, Transition};
pub use lizard::LizardEnv;

// Re-export core types
pub use lizard_rl_core::{Environment, Move, Position, Reward, Step, START};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{GridModel, LizardEnv};
    pub use lizard_rl_core::prelude::*;
}
