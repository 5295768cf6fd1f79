//! Grid model: an 8x8 board of cells addressed by linear index
//!
//! Index `i` maps to `(row, col) = (i / GRID_SIZE, i % GRID_SIZE)`. Row 0 is
//! the top of the board; gravity pulls towards higher rows.

use crate::matcher;
use crate::spawner::Spawner;
use crate::tile::{Cell, Special, TileType};
use std::fmt;
use std::str::FromStr;

/// Board side length
pub const GRID_SIZE: usize = 8;
/// Number of cells on the board
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Rounds of re-rolling allowed when dealing a fresh board
const MAX_DEAL_ROUNDS: usize = 64;

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a board with every cell vacant
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Deal a random board that contains no ready-made matches
    pub fn deal(spawner: &mut Spawner) -> Self {
        let mut board = Self::new();
        for cell in board.cells.iter_mut() {
            *cell = Cell::candy(spawner.next_tile());
        }

        // Re-roll every matched cell until the board is quiet
        for _ in 0..MAX_DEAL_ROUNDS {
            let matches = matcher::find_matches(&board);
            if matches.is_empty() {
                break;
            }
            for m in &matches {
                for &index in &m.indices {
                    board.cells[index] = Cell::candy(spawner.next_tile());
                }
            }
        }
        board
    }

    /// Linear index of `(row, col)`
    pub fn index(row: usize, col: usize) -> usize {
        row * GRID_SIZE + col
    }

    /// `(row, col)` of a linear index
    pub fn position(index: usize) -> (usize, usize) {
        (index / GRID_SIZE, index % GRID_SIZE)
    }

    /// Get the cell at an index
    /// Returns None if out of bounds
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Set a cell
    /// Returns false if out of bounds
    pub fn set(&mut self, index: usize, cell: Cell) -> bool {
        match self.cells.get_mut(index) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Make a cell vacant
    pub fn clear(&mut self, index: usize) -> bool {
        self.set(index, Cell::Empty)
    }

    /// Exchange the contents of two cells
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < CELL_COUNT && b < CELL_COUNT {
            self.cells.swap(a, b);
        }
    }

    /// Whether two indices are orthogonal neighbours
    pub fn are_adjacent(a: usize, b: usize) -> bool {
        if a >= CELL_COUNT || b >= CELL_COUNT {
            return false;
        }
        let (ra, ca) = Self::position(a);
        let (rb, cb) = Self::position(b);
        ra.abs_diff(rb) + ca.abs_diff(cb) == 1
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Indices of a full row
    pub fn row(row: usize) -> impl Iterator<Item = usize> {
        (0..GRID_SIZE).map(move |col| Self::index(row, col))
    }

    /// Indices of a full column
    pub fn column(col: usize) -> impl Iterator<Item = usize> {
        (0..GRID_SIZE).map(move |row| Self::index(row, col))
    }

    /// Indices of the square of given radius around `center`, clipped to the board
    pub fn square(center: usize, radius: usize) -> Vec<usize> {
        let (row, col) = Self::position(center);
        let rows = row.saturating_sub(radius)..=(row + radius).min(GRID_SIZE - 1);
        let cols = col.saturating_sub(radius)..=(col + radius).min(GRID_SIZE - 1);
        rows.flat_map(|r| cols.clone().map(move |c| Self::index(r, c)))
            .collect()
    }

    /// Indices of the cells a special tile detonates
    pub fn blast(index: usize, special: Special) -> Vec<usize> {
        let (row, col) = Self::position(index);
        match special {
            Special::StripedHorizontal => Self::row(row).collect(),
            Special::StripedVertical => Self::column(col).collect(),
            Special::AreaBomb => Self::square(index, 1),
        }
    }

    /// Indices of every cell showing the same tile as `cell`
    pub fn matching(&self, cell: &Cell) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.same_type(cell))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of every candy of a type
    pub fn indices_of(&self, kind: TileType) -> Vec<usize> {
        self.matching(&Cell::candy(kind))
    }

    /// Candy types currently on the board, in catalog order
    pub fn kinds_present(&self) -> Vec<TileType> {
        TileType::ALL
            .into_iter()
            .filter(|kind| self.cells.iter().any(|c| c.kind() == Some(*kind)))
            .collect()
    }

    /// Number of vacant cells
    #[cfg(test)]
    pub fn vacant_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }
}

/// Text layout: one line per row, whitespace separated tokens.
/// `S K M I D C` plain candies, suffix `-`/`|`/`@` for
/// horizontal stripe, vertical stripe and bomb, `*` rainbow, `.` empty.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            let tokens: Vec<String> = Self::row(row)
                .map(|i| match self.cells[i] {
                    Cell::Empty => ".".to_string(),
                    Cell::Rainbow => "*".to_string(),
                    Cell::Candy { kind, special } => {
                        let suffix = match special {
                            None => "",
                            Some(Special::StripedHorizontal) => "-",
                            Some(Special::StripedVertical) => "|",
                            Some(Special::AreaBomb) => "@",
                        };
                        format!("{}{}", kind.letter(), suffix)
                    }
                })
                .collect();
            writeln!(f, "{}", tokens.join(" "))?;
        }
        Ok(())
    }
}

/// Error for a malformed text layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("expected {expected} rows, found {0}", expected = GRID_SIZE)]
    RowCount(usize),
    #[error("row {0}: expected {expected} cells, found {1}", expected = GRID_SIZE)]
    RowWidth(usize, usize),
    #[error("row {0}: bad cell `{1}`")]
    BadCell(usize, String),
}

impl FromStr for Board {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != GRID_SIZE {
            return Err(LayoutError::RowCount(rows.len()));
        }

        let mut board = Board::new();
        for (row, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != GRID_SIZE {
                return Err(LayoutError::RowWidth(row, tokens.len()));
            }
            for (col, token) in tokens.iter().enumerate() {
                let cell = parse_cell(token).ok_or_else(|| LayoutError::BadCell(row, token.to_string()))?;
                board.cells[Self::index(row, col)] = cell;
            }
        }
        Ok(board)
    }
}

fn parse_cell(token: &str) -> Option<Cell> {
    let mut chars = token.chars();
    let first = chars.next()?;
    match first {
        '.' => return Some(Cell::Empty),
        '*' => return Some(Cell::Rainbow),
        _ => {}
    }
    let kind = TileType::from_letter(first)?;
    let special = match chars.next() {
        None => None,
        Some('-') => Some(Special::StripedHorizontal),
        Some('|') => Some(Special::StripedVertical),
        Some('@') => Some(Special::AreaBomb),
        Some(_) => return None,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(Cell::Candy { kind, special })
}
