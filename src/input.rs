//! Keyboard and mouse input mapped to game actions

use crate::board::{Board, GRID_SIZE};
use crate::game::Action;
use crate::settings::Settings;
use crate::ui::CELL_WIDTH;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub up: Vec<KeyCode>,
    pub down: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub select: Vec<KeyCode>,
    pub shuffle: Vec<KeyCode>,
    pub color_bomb: Vec<KeyCode>,
    pub back: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings, skipping names we don't know
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().filter_map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            up: Self::parse_keys(&keys.up),
            down: Self::parse_keys(&keys.down),
            left: Self::parse_keys(&keys.left),
            right: Self::parse_keys(&keys.right),
            select: Self::parse_keys(&keys.select),
            shuffle: Self::parse_keys(&keys.shuffle),
            color_bomb: Self::parse_keys(&keys.color_bomb),
            back: Self::parse_keys(&keys.back),
        }
    }

    /// Action bound to a key, checked in a fixed order
    fn action_for(&self, code: KeyCode) -> Option<Action> {
        let table = [
            (&self.up, Action::Up),
            (&self.down, Action::Down),
            (&self.left, Action::Left),
            (&self.right, Action::Right),
            (&self.select, Action::Select),
            (&self.shuffle, Action::Shuffle),
            (&self.color_bomb, Action::ColorBomb),
            (&self.back, Action::Back),
        ];
        table
            .into_iter()
            .find(|(keys, _)| keys.contains(&code))
            .map(|(_, action)| action)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Where the left button went down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    x: u16,
    y: u16,
    cell: usize,
}

/// How far a press has been dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    /// Still within the pressed cell's reach
    Short,
    /// Past the threshold, pointing at this neighbour
    Toward(usize),
    /// Past the threshold, pointing off the board
    Blocked,
}

/// Turns terminal events into game actions
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    bindings: KeyBindings,
    pressed: Option<Press>,
}

impl InputHandler {
    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
            pressed: None,
        }
    }

    /// Handle a key press event
    pub fn key_down(&self, key: KeyEvent) -> Option<Action> {
        // Ctrl+C always leaves
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Back);
        }
        self.bindings.action_for(normalize_key(key.code))
    }

    /// Handle a mouse event
    ///
    /// A press on the board is a tap when released in place, or a swipe
    /// towards the neighbour on the dominant axis once dragged a full cell.
    pub fn mouse(&mut self, mouse: MouseEvent, board: Rect) -> Option<Action> {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = cell_at(board, x, y).map(|cell| Press { x, y, cell });
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let press = self.pressed?;
                match drag(press, x, y) {
                    Drag::Short => None,
                    Drag::Toward(to) => {
                        self.pressed = None;
                        Some(Action::Swipe { from: press.cell, to })
                    }
                    Drag::Blocked => {
                        self.pressed = None;
                        None
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let press = self.pressed.take()?;
                match drag(press, x, y) {
                    Drag::Short => Some(Action::Click(press.cell)),
                    Drag::Toward(to) => Some(Action::Swipe { from: press.cell, to }),
                    Drag::Blocked => None,
                }
            }
            _ => None,
        }
    }
}

/// Classify a drag from `press` to `(x, y)`; a cell is CELL_WIDTH columns by one row
fn drag(press: Press, x: u16, y: u16) -> Drag {
    let dx = i32::from(x) - i32::from(press.x);
    let dy = i32::from(y) - i32::from(press.y);
    let width = i32::from(CELL_WIDTH);
    if dx.abs() < width && dy == 0 {
        return Drag::Short;
    }

    let (row, col) = Board::position(press.cell);
    let (row, col) = if dx.abs() >= dy.abs() * width {
        (row as i32, col as i32 + dx.signum())
    } else {
        (row as i32 + dy.signum(), col as i32)
    };
    let last = GRID_SIZE as i32 - 1;
    if (0..=last).contains(&row) && (0..=last).contains(&col) {
        Drag::Toward(Board::index(row as usize, col as usize))
    } else {
        Drag::Blocked
    }
}

/// Board cell under a screen position, given the board's inner area
pub fn cell_at(board: Rect, x: u16, y: u16) -> Option<usize> {
    if x < board.x || y < board.y {
        return None;
    }
    let col = ((x - board.x) / CELL_WIDTH) as usize;
    let row = (y - board.y) as usize;
    (row < GRID_SIZE && col < GRID_SIZE).then(|| Board::index(row, col))
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn down(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    fn up(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Up(MouseButton::Left), column, row)
    }

    fn drag_to(column: u16, row: u16) -> MouseEvent {
        mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    /// Press and release in place
    fn click(input: &mut InputHandler, board: Rect, column: u16, row: u16) -> Option<Action> {
        assert_eq!(input.mouse(down(column, row), board), None);
        input.mouse(up(column, row), board)
    }

    #[test]
    fn test_default_keys() {
        let input = InputHandler::default();
        assert_eq!(input.key_down(press(KeyCode::Left)), Some(Action::Left));
        assert_eq!(input.key_down(press(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(input.key_down(press(KeyCode::Enter)), Some(Action::Select));
        assert_eq!(input.key_down(press(KeyCode::Char('S'))), Some(Action::Shuffle));
        assert_eq!(input.key_down(press(KeyCode::Char('b'))), Some(Action::ColorBomb));
        assert_eq!(input.key_down(press(KeyCode::Esc)), Some(Action::Back));
        assert_eq!(input.key_down(press(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_ctrl_c_goes_back() {
        let input = InputHandler::default();
        let key = KeyEvent::new_with_kind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert_eq!(input.key_down(key), Some(Action::Back));
    }

    #[test]
    fn test_bindings_from_settings() {
        let mut settings = Settings::default();
        settings.keys.shuffle = vec!["Tab".to_string(), "bogus".to_string()];
        let bindings = KeyBindings::from_settings(&settings);
        assert_eq!(bindings.shuffle, vec![KeyCode::Tab]);
        assert_eq!(KeyBindings::parse_key("ESCAPE"), Some(KeyCode::Esc));
        assert_eq!(KeyBindings::parse_key("X"), Some(KeyCode::Char('x')));
    }

    #[test]
    fn test_click_maps_to_cell() {
        let mut input = InputHandler::default();
        let board = Rect::new(10, 5, 8 * CELL_WIDTH, 8);
        assert_eq!(click(&mut input, board, 10, 5), Some(Action::Click(0)));
        let x = 10 + 3 * CELL_WIDTH + 1;
        assert_eq!(click(&mut input, board, x, 7), Some(Action::Click(Board::index(2, 3))));
        assert_eq!(click(&mut input, board, 9, 5), None);
        assert_eq!(click(&mut input, board, 10, 13), None);
        assert_eq!(click(&mut input, board, 10 + 8 * CELL_WIDTH, 5), None);
    }

    #[test]
    fn test_drag_swipes_towards_the_dominant_axis() {
        let mut input = InputHandler::default();
        let board = Rect::new(0, 0, 8 * CELL_WIDTH, 8);
        let from = Board::index(2, 2);
        let (x, y) = (2 * CELL_WIDTH, 2);

        // A wobble inside the cell is still a tap
        input.mouse(down(x, y), board);
        assert_eq!(input.mouse(drag_to(x + 1, y), board), None);
        assert_eq!(input.mouse(up(x + 1, y), board), Some(Action::Click(from)));

        // Mostly sideways, one row of drift
        input.mouse(down(x, y), board);
        let swipe = input.mouse(drag_to(x + CELL_WIDTH + 2, y + 1), board);
        assert_eq!(swipe, Some(Action::Swipe { from, to: Board::index(2, 3) }));
        // The release after a swipe does nothing more
        assert_eq!(input.mouse(up(x + CELL_WIDTH + 2, y + 1), board), None);

        // Released far below without drag events
        input.mouse(down(x, y), board);
        let swipe = input.mouse(up(x, y + 5), board);
        assert_eq!(swipe, Some(Action::Swipe { from, to: Board::index(3, 2) }));
    }

    #[test]
    fn test_swipe_off_the_edge_is_dropped() {
        let mut input = InputHandler::default();
        let board = Rect::new(4, 4, 8 * CELL_WIDTH, 8);
        input.mouse(down(4, 4), board);
        assert_eq!(input.mouse(drag_to(4, 2), board), None);
        assert_eq!(input.mouse(up(4, 2), board), None);

        // Dragging without a press on the board
        assert_eq!(input.mouse(drag_to(20, 6), board), None);
        assert_eq!(input.mouse(up(20, 6), board), None);
    }
}
