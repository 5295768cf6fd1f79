//! Cascade controller
//!
//! Drains the board of matches one round at a time. Every round walks
//! `Detecting -> Resolving -> Destroying -> ScoringCheck -> Gravity` and the
//! loop ends on the first detection pass that finds nothing. The controller
//! never sleeps: it hands back a [`Signal`] at each suspension point and the
//! caller decides when to advance it again.

use crate::board::Board;
use crate::destroy::destroy;
use crate::gravity::apply_gravity;
use crate::matcher::{find_matches, Match};
use crate::resolver::{resolve, Resolution};
use crate::spawner::Spawner;
use crate::tile::Cell;
use std::time::Duration;
use tracing::debug;

/// Fixed-length presentation delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Swap,
    /// Two specials merging before a combination goes off
    Merge,
    Destroy,
    Gravity,
    Shuffle,
    /// Breather between cascade rounds
    Pause,
}

impl Animation {
    /// Nominal length in milliseconds
    pub fn base_millis(&self) -> u64 {
        match self {
            Animation::Swap => 200,
            Animation::Merge => 300,
            Animation::Destroy => 300,
            Animation::Gravity => 450,
            Animation::Shuffle => 900,
            Animation::Pause => 250,
        }
    }

    /// Length scaled by a percentage (100 = nominal, 0 = instant)
    pub fn duration(&self, speed_percent: u32) -> Duration {
        Duration::from_millis(self.base_millis() * u64::from(speed_percent) / 100)
    }
}

/// Result of one scoring step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// 1-based round number within the cascade
    pub number: u32,
    /// Cells cleared, chain reactions included
    pub cleared: usize,
    /// Specials written into the board this round
    pub created: Vec<Cell>,
}

/// What the caller has to do before advancing again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Let the animation play out
    Wait(Animation),
    /// Add the round to the score and check for a win
    Scored(Round),
    /// No matches left, the cascade is idle
    Done,
}

#[derive(Debug, Clone, Default)]
enum Stage {
    #[default]
    Idle,
    Detecting,
    Resolving(Vec<Match>),
    Destroying(Resolution),
    ScoringCheck(Round),
    Gravity,
    Pause,
}

/// Single-flight cascade state machine
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    stage: Stage,
    /// Cells the player touched, only honoured in the first round
    priority: Vec<usize>,
    round: u32,
    /// Cells cleared by the latest destroy step
    cleared: Vec<usize>,
    /// Cells filled by the latest gravity step
    landed: Vec<usize>,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a cascade; rejected while one is already running
    pub fn start(&mut self, priority: Vec<usize>) -> bool {
        if self.is_running() {
            debug!("cascade already running, start ignored");
            return false;
        }
        self.stage = Stage::Detecting;
        self.priority = priority;
        self.round = 0;
        self.cleared.clear();
        self.landed.clear();
        true
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.stage, Stage::Idle)
    }

    /// Drop any work in flight
    pub fn abort(&mut self) {
        self.stage = Stage::Idle;
        self.priority.clear();
        self.cleared.clear();
        self.landed.clear();
    }

    /// Cells the latest gravity step dropped or spawned a tile into
    pub fn landed(&self) -> &[usize] {
        &self.landed
    }

    /// Cells the latest destroy step cleared, for the burst effect
    pub fn cleared(&self) -> &[usize] {
        &self.cleared
    }

    /// Run stages until the next suspension point
    pub fn advance(&mut self, board: &mut Board, spawner: &mut Spawner) -> Signal {
        loop {
            match std::mem::take(&mut self.stage) {
                Stage::Idle => return Signal::Done,
                Stage::Detecting => {
                    let matches = find_matches(board);
                    if matches.is_empty() {
                        debug!(rounds = self.round, "cascade settled");
                        self.priority.clear();
                        return Signal::Done;
                    }
                    self.round += 1;
                    self.stage = Stage::Resolving(matches);
                }
                Stage::Resolving(matches) => {
                    let resolution = resolve(board, &matches, &self.priority);
                    self.priority.clear();
                    self.stage = Stage::Destroying(resolution);
                }
                Stage::Destroying(resolution) => {
                    self.cleared = destroy(board, &resolution.destroy, spawner);
                    for spawn in &resolution.spawns {
                        board.set(spawn.index, spawn.cell);
                    }
                    debug!(
                        round = self.round,
                        cleared = self.cleared.len(),
                        specials = resolution.spawns.len(),
                        "cascade round"
                    );
                    self.stage = Stage::ScoringCheck(Round {
                        number: self.round,
                        cleared: self.cleared.len(),
                        created: resolution.spawns.iter().map(|s| s.cell).collect(),
                    });
                    return Signal::Wait(Animation::Destroy);
                }
                Stage::ScoringCheck(round) => {
                    self.stage = Stage::Gravity;
                    return Signal::Scored(round);
                }
                Stage::Gravity => {
                    self.landed = apply_gravity(board, spawner).landed();
                    self.cleared.clear();
                    self.stage = Stage::Pause;
                    return Signal::Wait(Animation::Gravity);
                }
                Stage::Pause => {
                    self.stage = Stage::Detecting;
                    return Signal::Wait(Animation::Pause);
                }
            }
        }
    }
}
