//! Q-learning for the lizard grid world
//!
//! A [`TrainingSession`] owns the Q-table and the exploration rate for a
//! whole training run. Episodes are driven one at a time against any
//! [`Environment`](lizard_rl_core::Environment); after every step the
//! session hands a [`Snapshot`] to a [`SnapshotObserver`] and waits on a
//! [`Pacer`], which is where a renderer hooks in. Once training is done,
//! [`GreedyPlayback`] walks the learned policy from the start cell.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod checkpoint;
pub mod config;
pub mod episode;
pub mod observer;
pub mod pacing;
pub mod playback;
pub mod schedule;
pub mod session;

pub use checkpoint::QTableCheckpoint;
pub use config::TrainingConfig;
pub use episode::{EpisodeProgress, EpisodeStatus, StepReport};
pub use observer::{
    ChannelObserver, FnObserver, NullObserver, Phase, RecordingObserver, Snapshot,
    SnapshotObserver,
};
pub use pacing::{CancelToken, FixedDelay, NoPacing, Pacer, RunHooks};
pub use playback::{GreedyPlayback, PlaybackOutcome, BOUNDARY_PENALTY};
pub use schedule::StepDecay;
pub use session::{TrainingReport, TrainingSession};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CancelToken, GreedyPlayback, NullObserver, RunHooks, Snapshot, SnapshotObserver,
        TrainingConfig, TrainingSession,
    };
    pub use lizard_rl_core::prelude::*;
}
