//! Swap combinations
//!
//! Swapping two tiles where at least one is special (or a rainbow) skips
//! the ordinary swap and sets off a combined effect instead.

use crate::board::{Board, GRID_SIZE};
use crate::tile::{Cell, Special};

/// Combined effect of swapping two charged tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combo {
    /// Two rainbows: the whole board goes
    DoubleRainbow,
    /// Every candy of the special's type becomes that special, then all go off
    RainbowSpecial { rainbow: usize, special: usize },
    /// Every candy of the plain tile's type goes
    RainbowPlain { rainbow: usize, plain: usize },
    /// Two bombs: 5x5 block
    MegaBomb,
    /// Bomb and stripe: three rows and three columns
    SuperCross,
    /// Two stripes: one row and one column
    Cross,
}

impl Combo {
    /// Display name for the action label
    pub fn name(&self) -> &'static str {
        match self {
            Combo::DoubleRainbow => "Double Rainbow",
            Combo::RainbowSpecial { .. } => "Rainbow Blast",
            Combo::RainbowPlain { .. } => "Colour Wipe",
            Combo::MegaBomb => "Mega Bomb",
            Combo::SuperCross => "Super Cross",
            Combo::Cross => "Cross",
        }
    }

    /// Rainbow cell that is discarded without detonating
    pub fn spent_rainbow(&self) -> Option<usize> {
        match *self {
            Combo::RainbowSpecial { rainbow, .. } | Combo::RainbowPlain { rainbow, .. } => Some(rainbow),
            _ => None,
        }
    }
}

/// Decide whether swapping `first` with `second` is a combination
pub fn classify(board: &Board, first: usize, second: usize) -> Option<Combo> {
    let a = board.get(first)?;
    let b = board.get(second)?;

    match (a, b) {
        (Cell::Rainbow, Cell::Rainbow) => Some(Combo::DoubleRainbow),
        (Cell::Rainbow, other) | (other, Cell::Rainbow) => {
            let (rainbow, partner) = if a.is_rainbow() { (first, second) } else { (second, first) };
            match other {
                Cell::Candy { special: Some(_), .. } => Some(Combo::RainbowSpecial {
                    rainbow,
                    special: partner,
                }),
                Cell::Candy { special: None, .. } => Some(Combo::RainbowPlain {
                    rainbow,
                    plain: partner,
                }),
                _ => None,
            }
        }
        (
            Cell::Candy {
                special: Some(x), ..
            },
            Cell::Candy {
                special: Some(y), ..
            },
        ) => Some(match (x, y) {
            (Special::AreaBomb, Special::AreaBomb) => Combo::MegaBomb,
            (Special::AreaBomb, _) | (_, Special::AreaBomb) => Combo::SuperCross,
            _ => Combo::Cross,
        }),
        _ => None,
    }
}

/// Prepare the board and return the seeds to destroy
///
/// Positional combos are centred on `center`. The rainbow of a rainbow
/// combo is cleared here so it never detonates on its own.
pub fn prime(board: &mut Board, combo: Combo, center: usize) -> Vec<usize> {
    let (row, col) = Board::position(center);
    if let Some(rainbow) = combo.spent_rainbow() {
        board.clear(rainbow);
    }

    match combo {
        Combo::DoubleRainbow => (0..board.cells().len()).collect(),
        Combo::RainbowSpecial { special, .. } => {
            let Some(Cell::Candy {
                kind,
                special: Some(upgrade),
            }) = board.get(special)
            else {
                return Vec::new();
            };
            let targets = board.indices_of(kind);
            for &index in &targets {
                board.set(index, Cell::special(kind, upgrade));
            }
            targets
        }
        Combo::RainbowPlain { plain, .. } => match board.get(plain).and_then(|c| c.kind()) {
            Some(kind) => board.indices_of(kind),
            None => Vec::new(),
        },
        Combo::MegaBomb => Board::square(center, 2),
        Combo::SuperCross => {
            let rows = lines_around(row);
            let mut targets: Vec<usize> = rows.clone().flat_map(Board::row).collect();
            for line in lines_around(col) {
                targets.extend(Board::column(line).filter(|&i| !rows.contains(&Board::position(i).0)));
            }
            targets
        }
        Combo::Cross => {
            let mut targets: Vec<usize> = Board::row(row).collect();
            targets.extend(Board::column(col).filter(|&i| i != center));
            targets
        }
    }
}

/// The line and its neighbours, clipped to the board
fn lines_around(line: usize) -> std::ops::RangeInclusive<usize> {
    line.saturating_sub(1)..=(line + 1).min(GRID_SIZE - 1)
}
