//! Terminal UI rendering with ratatui

use crate::board::{Board, GRID_SIZE};
use crate::cascade::Animation;
use crate::game::{Game, GameState};
use crate::icons::IconProvider;
use crate::level::{LEVELS, Level};
use crate::settings::{KeyBindings, Settings};
use crate::tile::{Cell, Special};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";
/// Drawn over cells that were just cleared
const BURST: &str = "✸ ";

/// Terminal columns per board cell: glyph(2) + special marker + gap
pub const CELL_WIDTH: u16 = 4;
/// Board plus its borders
const BOARD_WIDTH: u16 = GRID_SIZE as u16 * CELL_WIDTH + 2;
const BOARD_HEIGHT: u16 = GRID_SIZE as u16 + 2;
/// Stats and boosters column
const SIDE_WIDTH: u16 = 24;
/// Board + side panel
const GAME_WIDTH: u16 = BOARD_WIDTH + SIDE_WIDTH;
/// Board + one line of key hints
const GAME_HEIGHT: u16 = BOARD_HEIGHT + 1;

/// Screen area of the board's border box
fn board_rect(area: Rect) -> Rect {
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);
    Rect {
        width: BOARD_WIDTH.min(game_area.width),
        height: BOARD_HEIGHT.min(game_area.height),
        ..game_area
    }
}

/// Area the board's cells are drawn in; mouse clicks are mapped against it
pub fn board_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(board_rect(area))
}

/// First configured key for an action, as shown in the hint line
fn key_label(keys: &[String]) -> String {
    let Some(key) = keys.first() else {
        return "-".to_string();
    };
    match key.to_lowercase().as_str() {
        "up" => "↑".to_string(),
        "down" => "↓".to_string(),
        "left" => "←".to_string(),
        "right" => "→".to_string(),
        _ if key.chars().count() == 1 => key.to_uppercase(),
        _ => key.clone(),
    }
}

/// Key hint line built from the configured bindings
fn controls_hint(keys: &KeyBindings) -> String {
    let movement: String = [&keys.left, &keys.up, &keys.down, &keys.right]
        .iter()
        .map(|k| key_label(k))
        .collect();
    format!(
        "{} Move  {} Select  {} Shuffle  {} Eraser  {} Back",
        movement,
        key_label(&keys.select),
        key_label(&keys.shuffle),
        key_label(&keys.color_bomb),
        key_label(&keys.back)
    )
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings, icons: &dyn IconProvider) {
    let area = frame.area();
    let board_area = board_rect(area);
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    render_board(frame, board_area, game, icons);

    let side = Rect {
        x: board_area.x + board_area.width,
        y: game_area.y,
        width: game_area.width.saturating_sub(board_area.width),
        height: board_area.height,
    };
    render_stats(frame, side, game);

    let hints = Rect {
        y: game_area.y + board_area.height,
        height: game_area.height.saturating_sub(board_area.height),
        ..game_area
    };
    frame.render_widget(
        Paragraph::new(Line::styled(
            controls_hint(&settings.keys),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        hints,
    );

    // Overlays
    if game.intro {
        let title = format!("LEVEL {}", game.level_index + 1);
        render_overlay(frame, area, &title, &game.level.description());
        return;
    }
    match game.state {
        GameState::Won if Level::is_final(game.level_index) => {
            render_overlay(frame, area, "CHAMPION!", "All levels cleared. Enter to restart")
        }
        GameState::Won => {
            let subtitle = format!("Enter for level {}", game.level_index + 2);
            render_overlay(frame, area, "LEVEL COMPLETE", &subtitle);
        }
        GameState::Lost => render_overlay(frame, area, "OUT OF MOVES", "Enter to retry"),
        GameState::Playing => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Marker drawn right of a special candy
fn special_marker(cell: &Cell) -> &'static str {
    match cell.upgrade() {
        Some(Special::StripedHorizontal) => "-",
        Some(Special::StripedVertical) => "|",
        Some(Special::AreaBomb) => "@",
        None => " ",
    }
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, icons: &dyn IconProvider) {
    let title = match game.animation() {
        Some(Animation::Shuffle) => " SHUFFLE! ".to_string(),
        _ => format!(" LEVEL {} ", game.level_index + 1),
    };
    let border = if game.targeting {
        Color::Magenta
    } else {
        Color::White
    };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let burst = game.burst();
    let landing = game.landing();
    let mut lines: Vec<Line> = Vec::with_capacity(GRID_SIZE);

    for row in 0..GRID_SIZE {
        let mut spans = Vec::with_capacity(GRID_SIZE * 2);
        for col in 0..GRID_SIZE {
            let index = Board::index(row, col);
            let cell = game.board.get(index).unwrap_or_default();
            let selected = game.selected == Some(index);

            let background = if burst.contains(&index) {
                Some(Color::Red)
            } else if selected {
                Some(Color::Yellow)
            } else if landing.contains(&index) {
                Some(Color::Blue)
            } else if index == game.cursor && !game.is_processing() {
                Some(if game.targeting {
                    Color::Magenta
                } else {
                    Color::DarkGray
                })
            } else {
                None
            };
            let base = background.map_or_else(Style::default, |bg| Style::default().bg(bg));

            let glyph = match cell.symbol() {
                Some(symbol) => {
                    let accent = selected.then_some(Color::Black);
                    let icon = icons.visual(symbol, accent);
                    Span::styled(icon.glyph, base.fg(icon.color))
                }
                None if burst.contains(&index) => Span::styled(BURST, base.fg(Color::White).bold()),
                None => Span::styled(EMPTY, base),
            };
            spans.push(glyph);
            spans.push(Span::styled(
                format!("{} ", special_marker(&cell)),
                base.fg(Color::Yellow).bold(),
            ));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let mut lines = vec![
        label("SCORE"),
        Line::from(vec![
            Span::styled(format!("{}", game.score.points), Style::default().fg(Color::Yellow).bold()),
            Span::styled(format!(" / {}", game.level.target), Style::default().fg(Color::Gray)),
        ]),
        label("MOVES"),
        Line::from(Span::styled(
            format!("{}", game.moves_left),
            Style::default().fg(if game.moves_left <= 3 { Color::Red } else { Color::Cyan }),
        )),
        label("BOOSTERS"),
        Line::from(format!("Shuffle x{}", game.boosters.shuffle)),
        Line::from(format!("Eraser  x{}", game.boosters.color_bomb)),
        Line::styled(
            format!("Cleared {}  Chain {}", game.score.cleared, game.score.best_cascade),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if game.targeting {
        lines.push(Line::styled("Tap a tile to erase", Style::default().fg(Color::Magenta)));
    } else if let Some(action) = &game.last_action {
        lines.push(Line::styled(action.clone(), Style::default().fg(Color::Magenta).bold()));
    } else {
        lines.push(Line::styled(
            format!("Level {} of {}", game.level_index + 1, LEVELS.len()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (intro, level complete, out of moves)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let text_width = title.chars().count().max(subtitle.chars().count()) as u16;
    let popup_width = (text_width + 4).max(24);
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
