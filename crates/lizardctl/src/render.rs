// Terminal rendering of training and playback snapshots

use async_trait::async_trait;
use std::fmt::Write as _;

use lizard_rl_agent::{Phase, Snapshot, SnapshotObserver};
use lizard_rl_core::{Move, Position, QTable, GRID_SIZE, NUM_STATES};
use lizard_rl_env::{Cell, GridModel};

fn cell_symbol(cell: Cell) -> char {
    match cell {
        Cell::Cricket => 'c',
        Cell::Empty => '.',
        Cell::Bird => 'B',
        Cell::FiveCrickets => 'C',
    }
}

/// Board with the lizard drawn as `L`, top row first
pub fn render_board(grid: &GridModel, lizard: Position) -> String {
    let mut out = String::new();
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let symbol = match Position::new(x, y) {
                Ok(pos) if pos == lizard => 'L',
                Ok(pos) => cell_symbol(grid.cell(pos)),
                Err(_) => '?',
            };
            out.push(' ');
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

/// One row per state, one column per move
pub fn render_q_table(values: &[[f64; Move::COUNT]; NUM_STATES]) -> String {
    let mut out = String::from("state ");
    for mv in Move::ALL {
        let _ = write!(out, "{:>9}", mv.to_string());
    }
    out.push('\n');
    for (state, row) in values.iter().enumerate() {
        let _ = write!(out, "{state:>5} ");
        for value in row {
            let _ = write!(out, "{value:>9.3}");
        }
        out.push('\n');
    }
    out
}

/// Greedy move per cell as arrows, terminal cells marked `*`
pub fn render_policy(grid: &GridModel, table: &QTable) -> String {
    let policy = table.greedy_policy();
    let mut out = String::new();
    for pos in Position::all() {
        let symbol = if grid.is_terminal(pos) {
            '*'
        } else {
            policy[pos.index().get()].arrow()
        };
        out.push(' ');
        out.push(symbol);
        if pos.x() == GRID_SIZE - 1 {
            out.push('\n');
        }
    }
    out
}

/// Human-readable frames on stdout
pub struct TextRenderer {
    grid: GridModel,
    every_step: bool,
}

impl TextRenderer {
    pub fn new(every_step: bool) -> Self {
        Self {
            grid: GridModel::new(),
            every_step,
        }
    }

    fn frame(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();
        let action = snapshot
            .action
            .map_or_else(|| "-".to_string(), |mv| mv.to_string());
        match snapshot.phase {
            Phase::Training => {
                let _ = writeln!(
                    out,
                    "episode {} step {} action {} reward {} epsilon {:.3}",
                    snapshot.episode + 1,
                    snapshot.step,
                    action,
                    snapshot.cumulative_reward,
                    snapshot.exploration_rate
                );
            }
            Phase::EpisodeReset => {
                let _ = writeln!(
                    out,
                    "episode {} done, back to start (epsilon {:.3})",
                    snapshot.episode + 1,
                    snapshot.exploration_rate
                );
            }
            Phase::Playback => {
                let _ = writeln!(
                    out,
                    "playback step {} action {} reward {}",
                    snapshot.step, action, snapshot.cumulative_reward
                );
            }
        }
        out.push_str(&render_board(&self.grid, snapshot.position));
        out.push_str(&render_q_table(&snapshot.q_table));
        out
    }
}

#[async_trait]
impl SnapshotObserver for TextRenderer {
    async fn on_snapshot(&mut self, snapshot: &Snapshot) {
        if snapshot.phase == Phase::Training && !self.every_step {
            return;
        }
        println!("{}", self.frame(snapshot));
    }
}

/// One JSON object per snapshot on stdout
pub struct JsonRenderer;

#[async_trait]
impl SnapshotObserver for JsonRenderer {
    async fn on_snapshot(&mut self, snapshot: &Snapshot) {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "could not encode snapshot"),
        }
    }
}
