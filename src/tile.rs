//! Tile catalog and cell contents
//!
//! Six candy types plus the rainbow tile. A candy may carry a special
//! upgrade (striped or area bomb); the rainbow has no base type at all.

use std::fmt;
use std::str::FromStr;

/// Symbolic name the icon provider reserves for the rainbow tile
pub const RAINBOW_SYMBOL: &str = "special";

/// The 6 candy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileType {
    Strawberry,
    Cake,
    Milkshake,
    IceCream,
    Donut,
    Candy,
}

impl TileType {
    /// Every candy type, in catalog order
    pub const ALL: [TileType; 6] = [
        TileType::Strawberry,
        TileType::Cake,
        TileType::Milkshake,
        TileType::IceCream,
        TileType::Donut,
        TileType::Candy,
    ];

    /// Symbolic name handed to the icon provider
    pub fn symbol(&self) -> &'static str {
        match self {
            TileType::Strawberry => "strawberry",
            TileType::Cake => "cake",
            TileType::Milkshake => "milkshake",
            TileType::IceCream => "icecream",
            TileType::Donut => "donut",
            TileType::Candy => "candy",
        }
    }

    /// Look a type up by its symbolic name
    pub fn from_symbol(name: &str) -> Option<TileType> {
        Self::ALL.into_iter().find(|t| t.symbol() == name)
    }

    /// Single-letter code used by the text layout
    pub fn letter(&self) -> char {
        match self {
            TileType::Strawberry => 'S',
            TileType::Cake => 'K',
            TileType::Milkshake => 'M',
            TileType::IceCream => 'I',
            TileType::Donut => 'D',
            TileType::Candy => 'C',
        }
    }

    pub fn from_letter(c: char) -> Option<TileType> {
        Self::ALL
            .into_iter()
            .find(|t| t.letter() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error for a tile name outside the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tile type `{0}`")]
pub struct UnknownTile(pub String);

impl FromStr for TileType {
    type Err = UnknownTile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s).ok_or_else(|| UnknownTile(s.to_string()))
    }
}

/// Upgrade carried by a candy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    /// Clears its whole row when destroyed
    StripedHorizontal,
    /// Clears its whole column when destroyed
    StripedVertical,
    /// Clears the 3x3 block around it when destroyed
    AreaBomb,
}

/// Contents of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Vacant, only seen between destruction and refill
    #[default]
    Empty,
    Candy {
        kind: TileType,
        special: Option<Special>,
    },
    /// Colour-less tile, never part of an ordinary run
    Rainbow,
}

impl Cell {
    /// A plain candy
    pub fn candy(kind: TileType) -> Self {
        Cell::Candy {
            kind,
            special: None,
        }
    }

    /// A candy carrying an upgrade
    pub fn special(kind: TileType, special: Special) -> Self {
        Cell::Candy {
            kind,
            special: Some(special),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_rainbow(&self) -> bool {
        matches!(self, Cell::Rainbow)
    }

    /// Candy type, `None` for empty and rainbow cells
    pub fn kind(&self) -> Option<TileType> {
        match self {
            Cell::Candy { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Special upgrade of a candy
    pub fn upgrade(&self) -> Option<Special> {
        match self {
            Cell::Candy { special, .. } => *special,
            _ => None,
        }
    }

    /// Whether both cells show the same tile (rainbows match each other)
    pub fn same_type(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Rainbow, Cell::Rainbow) => true,
            (Cell::Candy { kind: a, .. }, Cell::Candy { kind: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Symbolic name for the icon provider
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Cell::Empty => None,
            Cell::Candy { kind, .. } => Some(kind.symbol()),
            Cell::Rainbow => Some(RAINBOW_SYMBOL),
        }
    }
}
