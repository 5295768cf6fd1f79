//! Gravity and refill
//!
//! Each column is compacted downwards independently, keeping the order of
//! the surviving tiles, then topped up with fresh plain candies.

use crate::board::{Board, GRID_SIZE};
use crate::spawner::Spawner;
use crate::tile::Cell;

/// What one gravity pass changed, for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settle {
    /// Cells a surviving tile slid down into
    pub fallen: Vec<usize>,
    /// Cells filled with new candies
    pub spawned: Vec<usize>,
}

impl Settle {
    /// Cells that received a tile, fallen or fresh
    pub fn landed(&self) -> Vec<usize> {
        self.fallen.iter().chain(&self.spawned).copied().collect()
    }
}

/// Compact every column and refill the gaps
pub fn apply_gravity(board: &mut Board, spawner: &mut Spawner) -> Settle {
    let mut settle = Settle::default();

    for col in 0..GRID_SIZE {
        // Rows below `write` are settled
        let mut write = GRID_SIZE;
        for row in (0..GRID_SIZE).rev() {
            let from = Board::index(row, col);
            let cell = board.get(from).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            write -= 1;
            if write != row {
                let to = Board::index(write, col);
                board.set(to, cell);
                board.clear(from);
                settle.fallen.push(to);
            }
        }

        for row in 0..write {
            let index = Board::index(row, col);
            board.set(index, Cell::candy(spawner.next_tile()));
            settle.spawned.push(index);
        }
    }
    settle
}
