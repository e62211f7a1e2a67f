//! Snapshots handed to rendering collaborators
//!
//! Observers only ever see copies of the simulation state; nothing they do
//! feeds back into learning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use lizard_rl_core::{Move, Position, Reward, NUM_STATES};

/// Which loop produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// After a training step
    Training,
    /// After an episode ended and the lizard went back to the start
    EpisodeReset,
    /// After a greedy playback iteration
    Playback,
}

/// State of the run after a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Producing loop
    pub phase: Phase,
    /// Episode index within the run; 0 during playback
    pub episode: usize,
    /// Steps taken in the current episode or playback
    pub step: usize,
    /// Where the lizard is
    pub position: Position,
    /// The move just attempted, if any
    pub action: Option<Move>,
    /// Reward accumulated in the current episode
    pub cumulative_reward: Reward,
    /// Exploration rate after this step
    pub exploration_rate: f64,
    /// Full 9x4 value matrix, rows in state order
    pub q_table: [[f64; Move::COUNT]; NUM_STATES],
}

/// Receives a snapshot after every step
#[async_trait]
pub trait SnapshotObserver: Send {
    /// Handle one snapshot
    async fn on_snapshot(&mut self, snapshot: &Snapshot);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

#[async_trait]
impl SnapshotObserver for NullObserver {
    async fn on_snapshot(&mut self, _snapshot: &Snapshot) {}
}

/// Keeps every snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Snapshots in emission order
    pub snapshots: Vec<Snapshot>,
}

impl RecordingObserver {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots of one phase
    pub fn of_phase(&self, phase: Phase) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter().filter(move |s| s.phase == phase)
    }
}

#[async_trait]
impl SnapshotObserver for RecordingObserver {
    async fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshots.push(snapshot.clone());
    }
}

/// Forwards snapshots over a tokio channel.
///
/// Waits for capacity on a full channel; once the receiver is gone the
/// snapshots are dropped and the run carries on.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<Snapshot>,
}

impl ChannelObserver {
    /// Wrap a sender
    #[must_use]
    pub fn new(tx: mpsc::Sender<Snapshot>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl SnapshotObserver for ChannelObserver {
    async fn on_snapshot(&mut self, snapshot: &Snapshot) {
        if self.tx.send(snapshot.clone()).await.is_err() {
            tracing::trace!("snapshot receiver closed");
        }
    }
}

/// Calls a closure for each snapshot
pub struct FnObserver<F>(pub F);

#[async_trait]
impl<F> SnapshotObserver for FnObserver<F>
where
    F: FnMut(&Snapshot) + Send,
{
    async fn on_snapshot(&mut self, snapshot: &Snapshot) {
        (self.0)(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lizard_rl_core::{QTable, START};

    fn snapshot(phase: Phase) -> Snapshot {
        Snapshot {
            phase,
            episode: 0,
            step: 1,
            position: START,
            action: Some(Move::Up),
            cumulative_reward: Reward(-1.0),
            exploration_rate: 0.995,
            q_table: QTable::new().snapshot(),
        }
    }

    #[tokio::test]
    async fn test_recording_observer_filters_by_phase() {
        let mut recorder = RecordingObserver::new();
        recorder.on_snapshot(&snapshot(Phase::Training)).await;
        recorder.on_snapshot(&snapshot(Phase::EpisodeReset)).await;
        recorder.on_snapshot(&snapshot(Phase::Training)).await;
        assert_eq!(recorder.snapshots.len(), 3);
        assert_eq!(recorder.of_phase(Phase::Training).count(), 2);
    }

    #[tokio::test]
    async fn test_channel_observer_survives_closed_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut observer = ChannelObserver::new(tx);
        observer.on_snapshot(&snapshot(Phase::Playback)).await;
        assert_eq!(rx.recv().await.unwrap().phase, Phase::Playback);

        drop(rx);
        observer.on_snapshot(&snapshot(Phase::Playback)).await;
    }

    #[tokio::test]
    async fn test_fn_observer() {
        let mut count = 0;
        {
            let mut observer = FnObserver(|_: &Snapshot| count += 1);
            observer.on_snapshot(&snapshot(Phase::Training)).await;
            observer.on_snapshot(&snapshot(Phase::Training)).await;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(snapshot(Phase::EpisodeReset)).unwrap();
        assert_eq!(json["phase"], "episode_reset");
        assert_eq!(json["action"], "up");
        assert_eq!(json["q_table"].as_array().unwrap().len(), 9);
    }
}
