//! Special-tile resolution
//!
//! Turns one round of matches into a destroy set plus the special tiles
//! that replace each match's anchor cell.

use crate::board::Board;
use crate::matcher::{Match, MatchKind};
use crate::tile::{Cell, Special};
use std::collections::BTreeSet;

/// A special tile to write once the destroy set has been cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub index: usize,
    pub cell: Cell,
}

/// Outcome of resolving one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Seeds for the destruction engine
    pub destroy: Vec<usize>,
    /// Specials created this round
    pub spawns: Vec<Spawn>,
}

/// Cell that hosts the special a match leaves behind
///
/// Bombs use the crossing cell. Otherwise the first cell of the run that
/// the player touched wins, falling back to the middle of the run.
pub fn anchor(m: &Match, priority: &[usize]) -> usize {
    if let MatchKind::Bomb { center } = m.kind {
        return center;
    }
    m.indices
        .iter()
        .copied()
        .find(|i| priority.contains(i))
        .unwrap_or(m.indices[m.indices.len() / 2])
}

/// Build the destroy set and spawns for a list of matches
pub fn resolve(board: &Board, matches: &[Match], priority: &[usize]) -> Resolution {
    let mut destroy = BTreeSet::new();
    let mut spawns = Vec::new();

    for m in matches {
        destroy.extend(m.indices.iter().copied());

        let upgrade = match m.kind {
            MatchKind::Plain => continue,
            MatchKind::Rainbow => None,
            MatchKind::Bomb { .. } => Some(Special::AreaBomb),
            MatchKind::Striped(special) => Some(special),
        };

        let at = anchor(m, priority);
        // An anchor that is already special goes off before being replaced
        if let Some(existing) = board.get(at).and_then(|cell| cell.upgrade()) {
            destroy.extend(Board::blast(at, existing));
        }
        destroy.remove(&at);

        let tile = board.get(at).and_then(|cell| cell.kind()).unwrap_or(m.tile);
        let cell = match upgrade {
            Some(special) => Cell::special(tile, special),
            None => Cell::Rainbow,
        };
        spawns.push(Spawn { index: at, cell });
    }

    Resolution {
        destroy: destroy.into_iter().collect(),
        spawns,
    }
}
