//! Tile glyphs
//!
//! The board only knows symbolic tile names. An [`IconProvider`] turns a
//! name into something drawable; the terminal one uses food emoji or
//! coloured letters depending on the settings.

use crate::settings::GlyphStyle;
use crate::tile::{RAINBOW_SYMBOL, TileType};
use ratatui::style::Color;

/// Something the board can draw for one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    /// Two terminal columns wide
    pub glyph: &'static str,
    pub color: Color,
}

/// Maps a symbolic tile name to a visual
pub trait IconProvider {
    /// Visual for `symbol`, tinted with `accent` when given.
    /// Must answer for every catalog name, including the rainbow one.
    fn visual(&self, symbol: &str, accent: Option<Color>) -> Icon;
}

/// Emoji or letter glyphs for the terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalIcons {
    style: GlyphStyle,
}

impl TerminalIcons {
    pub fn new(style: GlyphStyle) -> Self {
        Self { style }
    }
}

impl IconProvider for TerminalIcons {
    fn visual(&self, symbol: &str, accent: Option<Color>) -> Icon {
        let (emoji, letter, color) = match TileType::from_symbol(symbol) {
            Some(TileType::Strawberry) => ("🍓", "S ", Color::Red),
            Some(TileType::Cake) => ("🍰", "K ", Color::LightYellow),
            Some(TileType::Milkshake) => ("🥤", "M ", Color::Magenta),
            Some(TileType::IceCream) => ("🍦", "I ", Color::Cyan),
            Some(TileType::Donut) => ("🍩", "D ", Color::LightRed),
            Some(TileType::Candy) => ("🍬", "C ", Color::Green),
            None if symbol == RAINBOW_SYMBOL => ("🌈", "* ", Color::White),
            None => ("??", "??", Color::DarkGray),
        };
        let glyph = match self.style {
            GlyphStyle::Emoji => emoji,
            GlyphStyle::Letters => letter,
        };
        Icon {
            glyph,
            color: accent.unwrap_or(color),
        }
    }
}
