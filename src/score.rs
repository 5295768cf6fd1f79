//! Scoring rules

use crate::combo::Combo;
use crate::tile::{Cell, Special};

/// Points per cell cleared by a cascade round
const CELL_POINTS: u64 = 10;
/// Flat bonus per special created by a cascade round
const SPECIAL_BONUS: u64 = 60;
/// Points per cell wiped by the colour eraser
const ERASER_POINTS: u64 = 20;

/// What produced a scoring event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearKind {
    /// One round of matches (1-based round number)
    Cascade {
        round: u32,
        cells: usize,
        created: Vec<Cell>,
    },
    /// A combination swap
    Combo { combo: Combo, cells: usize },
    /// The colour eraser booster
    ColorEraser { cells: usize },
}

/// Per-cell rate of a combination
pub fn combo_rate(combo: &Combo) -> u64 {
    match combo {
        Combo::DoubleRainbow => 50,
        Combo::RainbowSpecial { .. } | Combo::RainbowPlain { .. } => 20,
        Combo::MegaBomb => 30,
        Combo::SuperCross => 25,
        Combo::Cross => 20,
    }
}

/// Score of the running level
#[derive(Debug, Clone, Default)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Cells cleared this level
    pub cleared: u32,
    /// Longest cascade this level
    pub best_cascade: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the points for a clear
    /// Returns the action name for display
    pub fn add_clear(&mut self, kind: &ClearKind) -> String {
        let (points, cells) = match kind {
            ClearKind::Cascade { cells, created, .. } => {
                (*cells as u64 * CELL_POINTS + created.len() as u64 * SPECIAL_BONUS, *cells)
            }
            ClearKind::Combo { combo, cells } => (*cells as u64 * combo_rate(combo), *cells),
            ClearKind::ColorEraser { cells } => (*cells as u64 * ERASER_POINTS, *cells),
        };
        self.points += points;
        self.cleared += cells as u32;

        match kind {
            ClearKind::Cascade { round, created, .. } => {
                self.best_cascade = self.best_cascade.max(*round);
                let mut action = String::from(created_name(created).unwrap_or("Sweet"));
                if *round > 1 {
                    action.push_str(&format!(" Cascade x{}", round));
                }
                action
            }
            ClearKind::Combo { combo, .. } => format!("{}!", combo.name()),
            ClearKind::ColorEraser { cells } => format!("Erased {}!", cells),
        }
    }
}

/// Label for the best special created in a round
fn created_name(created: &[Cell]) -> Option<&'static str> {
    let rank = |cell: &Cell| match cell {
        Cell::Rainbow => 3,
        Cell::Candy {
            special: Some(Special::AreaBomb),
            ..
        } => 2,
        Cell::Candy { special: Some(_), .. } => 1,
        _ => 0,
    };
    match created.iter().map(rank).max()? {
        3 => Some("Rainbow!"),
        2 => Some("Bomb!"),
        1 => Some("Striped!"),
        _ => None,
    }
}
