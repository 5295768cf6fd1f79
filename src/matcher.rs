//! Match detection
//!
//! Rows and columns are scanned independently for runs of 3+ same-type
//! candies, then the runs are reconciled into classified matches:
//! runs of 5+ become rainbows, crossing runs become bombs, runs of 4
//! become striped tiles and runs of 3 are plain.

use crate::board::{Board, GRID_SIZE};
use crate::tile::{Special, TileType};

/// Minimum run length that counts as a match
pub const MIN_RUN: usize = 3;

/// Direction a run extends in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A maximal run of same-type candies along one row or column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub axis: Axis,
    pub kind: TileType,
    /// Indices in scan order (left to right, top to bottom)
    pub indices: Vec<usize>,
}

impl Run {
    fn crossing(&self, other: &Run) -> Option<usize> {
        self.indices
            .iter()
            .copied()
            .find(|i| other.indices.contains(i))
    }
}

/// What a match turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Exactly 3 in a line, everything is destroyed
    Plain,
    /// 4 in a line, leaves a striped tile clearing across the run
    Striped(Special),
    /// 5 or more in a line, leaves a rainbow
    Rainbow,
    /// A horizontal and a vertical run crossing at `center`
    Bomb { center: usize },
}

/// A classified match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub kind: MatchKind,
    pub tile: TileType,
    pub indices: Vec<usize>,
}

/// Collect every run of `MIN_RUN` or more, horizontal and vertical
pub fn find_runs(board: &Board) -> (Vec<Run>, Vec<Run>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    for line in 0..GRID_SIZE {
        scan_line(board, Board::row(line), Axis::Horizontal, &mut horizontal);
        scan_line(board, Board::column(line), Axis::Vertical, &mut vertical);
    }
    (horizontal, vertical)
}

fn scan_line(board: &Board, line: impl Iterator<Item = usize>, axis: Axis, out: &mut Vec<Run>) {
    let mut current: Option<Run> = None;

    for index in line {
        let kind = board.get(index).and_then(|cell| cell.kind());
        if let (Some(run), Some(kind)) = (current.as_mut(), kind) {
            if run.kind == kind {
                run.indices.push(index);
                continue;
            }
        }
        close_run(current.take(), out);
        current = kind.map(|kind| Run {
            axis,
            kind,
            indices: vec![index],
        });
    }
    close_run(current, out);
}

fn close_run(run: Option<Run>, out: &mut Vec<Run>) {
    if let Some(run) = run {
        if run.indices.len() >= MIN_RUN {
            out.push(run);
        }
    }
}

/// Find and classify every match on the board
pub fn find_matches(board: &Board) -> Vec<Match> {
    let (mut horizontal, mut vertical) = find_runs(board);
    let mut matches = Vec::new();

    // Long runs first, latest run in scan order wins ties
    promote_rainbows(&mut horizontal, &mut matches);
    promote_rainbows(&mut vertical, &mut matches);

    // Crossing runs: each run pairs with at most one partner,
    // scanning both lists from the back and taking the first hit
    let mut h = horizontal.len();
    while h > 0 {
        h -= 1;
        let partner = (0..vertical.len()).rev().find_map(|v| {
            if vertical[v].kind != horizontal[h].kind {
                return None;
            }
            horizontal[h].crossing(&vertical[v]).map(|center| (v, center))
        });
        if let Some((v, center)) = partner {
            let down = vertical.remove(v);
            let across = horizontal.remove(h);
            let mut indices = across.indices;
            indices.extend(down.indices.into_iter().filter(|i| *i != center));
            matches.push(Match {
                kind: MatchKind::Bomb { center },
                tile: across.kind,
                indices,
            });
        }
    }

    classify_short(&horizontal, &mut matches);
    classify_short(&vertical, &mut matches);
    matches
}

/// Whether the board holds at least one match
pub fn has_match(board: &Board) -> bool {
    let (horizontal, vertical) = find_runs(board);
    !horizontal.is_empty() || !vertical.is_empty()
}

fn promote_rainbows(runs: &mut Vec<Run>, matches: &mut Vec<Match>) {
    for i in (0..runs.len()).rev() {
        if runs[i].indices.len() >= 5 {
            let run = runs.remove(i);
            matches.push(Match {
                kind: MatchKind::Rainbow,
                tile: run.kind,
                indices: run.indices,
            });
        }
    }
}

fn classify_short(runs: &[Run], matches: &mut Vec<Match>) {
    for run in runs.iter().rev() {
        let kind = match (run.indices.len(), run.axis) {
            // The stripe clears across the run that made it
            (4, Axis::Horizontal) => MatchKind::Striped(Special::StripedVertical),
            (4, Axis::Vertical) => MatchKind::Striped(Special::StripedHorizontal),
            _ => MatchKind::Plain,
        };
        matches.push(Match {
            kind,
            tile: run.kind,
            indices: run.indices.clone(),
        });
    }
}
