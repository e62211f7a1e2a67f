//! Action selection

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::{ActionSpace, Move, MoveSpace, QTable, StateIndex};

/// Chooses a move for a state given the current value estimates
pub trait Policy: Send {
    /// Select a move. `exploration_rate` is ignored by policies that never explore.
    fn select(&mut self, state: StateIndex, table: &QTable, exploration_rate: f64) -> Move;
}

/// Which branch of epsilon-greedy a draw lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Uniformly random move
    Explore,
    /// Best-known move
    Exploit,
}

impl Decision {
    /// A draw at or below the rate explores; anything above exploits
    #[must_use]
    pub fn from_draw(draw: f64, exploration_rate: f64) -> Self {
        if draw <= exploration_rate {
            Self::Explore
        } else {
            Self::Exploit
        }
    }
}

/// Always takes the best-known move
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Policy for Greedy {
    fn select(&mut self, state: StateIndex, table: &QTable, _exploration_rate: f64) -> Move {
        table.best_action(state)
    }
}

/// Epsilon-greedy selection over the four moves
pub struct EpsilonGreedy<R = StdRng> {
    rng: R,
    space: MoveSpace,
}

impl EpsilonGreedy<StdRng> {
    /// Reproducible selection when a seed is given, entropy-seeded otherwise
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng)
    }
}

impl<R: RngCore> EpsilonGreedy<R> {
    /// Use a caller-supplied generator
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            space: MoveSpace,
        }
    }

    /// Draw `r` in `[0, 1)` and compare it with the rate
    pub fn decide(&mut self, exploration_rate: f64) -> Decision {
        let draw: f64 = self.rng.gen();
        Decision::from_draw(draw, exploration_rate)
    }
}

impl<R: RngCore + Send> Policy for EpsilonGreedy<R> {
    fn select(&mut self, state: StateIndex, table: &QTable, exploration_rate: f64) -> Move {
        match self.decide(exploration_rate) {
            Decision::Explore => {
                let mv = self.space.sample(&mut self.rng);
                tracing::trace!(%state, %mv, exploration_rate, "explore");
                mv
            }
            Decision::Exploit => table.best_action(state),
        }
    }
}
