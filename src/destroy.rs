//! Destruction with special-tile chain reactions
//!
//! Destroying a special tile detonates it: stripes take their row or
//! column, bombs their 3x3 block, rainbows every candy of one colour
//! still on the board. Detonated cells may be specials themselves, so the
//! destroy set is grown breadth-first until it is closed.

use crate::board::{Board, CELL_COUNT};
use crate::spawner::Spawner;
use crate::tile::Cell;
use std::collections::VecDeque;
use tracing::trace;

/// Cells a single tile takes with it when destroyed
pub fn detonation(board: &Board, index: usize, spawner: &mut Spawner) -> Vec<usize> {
    match board.get(index) {
        Some(Cell::Candy {
            special: Some(special),
            ..
        }) => Board::blast(index, special),
        Some(Cell::Rainbow) => match spawner.pick(&board.kinds_present()) {
            Some(kind) => board.indices_of(kind),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Close `seeds` under every detonation, in discovery order
pub fn expand(board: &Board, seeds: &[usize], spawner: &mut Spawner) -> Vec<usize> {
    let mut marked = [false; CELL_COUNT];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    for &seed in seeds {
        if seed < CELL_COUNT && !marked[seed] {
            marked[seed] = true;
            order.push(seed);
            queue.push_back(seed);
        }
    }

    // Each index enters the queue once, so this terminates
    while let Some(index) = queue.pop_front() {
        for target in detonation(board, index, spawner) {
            if !marked[target] {
                marked[target] = true;
                order.push(target);
                queue.push_back(target);
            }
        }
    }
    order
}

/// Destroy `seeds` and everything they set off; returns the cleared cells
pub fn destroy(board: &mut Board, seeds: &[usize], spawner: &mut Spawner) -> Vec<usize> {
    let cleared = expand(board, seeds, spawner);
    for &index in &cleared {
        board.clear(index);
    }
    trace!(seeds = seeds.len(), cleared = cleared.len(), "destroyed cells");
    cleared
}
