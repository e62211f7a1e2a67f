//! Core reinforcement learning types for the lizard grid world
//!
//! This crate provides the leaf abstractions shared by the environment and
//! the agent: the four moves, grid positions and state indices, reward
//! signals, the tabular Q-value store and epsilon-greedy action selection.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod environment;
pub mod error;
pub mod policy;
pub mod reward;
pub mod state;
pub mod value;

// Re-export core traits and types
pub use action::{ActionSpace, Move, MoveSpace};
pub use environment::{Environment, Episode, EpisodeOutcome, Step};
pub use error::{RLError, Result};
pub use policy::{Decision, EpsilonGreedy, Greedy, Policy};
pub use reward::Reward;
pub use state::{Position, StateIndex, GRID_SIZE, NUM_STATES, START};
pub use value::{QTable, DISCOUNT, LEARNING_RATE};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Environment, EpsilonGreedy, Move, Policy, Position, QTable, Result, Reward,
        StateIndex, Step,
    };
}
