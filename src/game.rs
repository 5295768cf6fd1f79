//! Core game state and logic
//!
//! A move or booster use never runs to completion on the spot. It queues
//! steps, and `update` works through them, pausing wherever an animation
//! has to play. While anything is queued or playing the game is processing
//! and ignores new moves.

use crate::board::{Board, CELL_COUNT, GRID_SIZE};
use crate::booster::{BoosterStore, Boosters};
use crate::cascade::{Animation, Cascade, Signal};
use crate::combo::{self, Combo};
use crate::destroy::destroy;
use crate::gravity::apply_gravity;
use crate::level::Level;
use crate::matcher::has_match;
use crate::score::{ClearKind, Score};
use crate::spawner::Spawner;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    /// Target reached
    Won,
    /// Out of moves
    Lost,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Tap the cell under the cursor, or confirm an overlay
    Select,
    /// Tap a cell directly
    Click(usize),
    /// Drag from one cell towards a neighbour
    Swipe { from: usize, to: usize },
    Shuffle,
    ColorBomb,
    Back,
}

/// One unit of queued work
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Swap { a: usize, b: usize },
    /// Keep the swap if it matched, otherwise swap back
    CheckSwap { a: usize, b: usize },
    Merge,
    Blast { combo: Combo, center: usize },
    Erase { index: usize },
    Shuffle,
    Gravity,
    StartCascade(Vec<usize>),
    Cascade,
}

/// The main game struct
pub struct Game {
    /// The game board
    pub board: Board,
    spawner: Spawner,
    cascade: Cascade,
    store: Box<dyn BoosterStore>,
    /// Booster counts in play
    pub boosters: Boosters,
    /// Counts at level start, restored on retry
    snapshot: Boosters,
    pub level_index: usize,
    pub level: Level,
    pub score: Score,
    pub moves_left: u32,
    pub state: GameState,
    /// First cell of a pending swap
    pub selected: Option<usize>,
    /// Colour eraser armed, waiting for a tap
    pub targeting: bool,
    /// Keyboard cursor
    pub cursor: usize,
    /// Level intro still showing
    pub intro: bool,
    /// Last action text to display
    pub last_action: Option<String>,
    queue: VecDeque<Step>,
    /// Animation currently playing
    animation: Option<Animation>,
    resume_at: Option<Instant>,
    /// Cells cleared by the latest destroy step
    burst: Vec<usize>,
    /// Cells filled by the latest gravity step
    landed: Vec<usize>,
    /// Animation speed in percent
    speed: u32,
    /// Host navigated away; nothing mutates any more
    detached: bool,
}

impl Game {
    /// Start a new run at the first level
    pub fn new(store: Box<dyn BoosterStore>, speed: u32) -> Self {
        Self::with_spawner(store, Spawner::new(), speed)
    }

    /// Start a new run drawing tiles from `spawner`
    pub fn with_spawner(store: Box<dyn BoosterStore>, spawner: Spawner, speed: u32) -> Self {
        let boosters = store.load();
        let mut game = Self {
            board: Board::new(),
            spawner,
            cascade: Cascade::new(),
            store,
            boosters,
            snapshot: boosters,
            level_index: 0,
            level: Level::for_index(0),
            score: Score::new(),
            moves_left: 0,
            state: GameState::Playing,
            selected: None,
            targeting: false,
            cursor: 0,
            intro: true,
            last_action: None,
            queue: VecDeque::new(),
            animation: None,
            resume_at: None,
            burst: Vec::new(),
            landed: Vec::new(),
            speed,
            detached: false,
        };
        game.start_level(0);
        game
    }

    /// Reset the session for a level; index 0 also resets the boosters.
    /// Other levels carry the counts in play forward, the store is only written.
    pub fn start_level(&mut self, index: usize) {
        if index == 0 {
            self.boosters = Boosters::default();
            self.persist();
        }
        self.snapshot = self.boosters;

        self.level_index = index;
        self.level = Level::for_index(index);
        self.board = Board::deal(&mut self.spawner);
        self.score = Score::new();
        self.moves_left = self.level.moves;
        self.state = GameState::Playing;
        self.selected = None;
        self.targeting = false;
        self.intro = true;
        self.last_action = None;
        self.queue.clear();
        self.cascade.abort();
        self.animation = None;
        self.resume_at = None;
        self.burst.clear();
        self.landed.clear();
        self.detached = false;

        info!(
            level = index + 1,
            target = self.level.target,
            moves = self.level.moves,
            shuffle = self.boosters.shuffle,
            color_bomb = self.boosters.color_bomb,
            "level started"
        );
    }

    /// Whether a move, cascade or animation is in flight
    pub fn is_processing(&self) -> bool {
        !self.queue.is_empty() || self.animation.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Animation currently playing
    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    /// Cells to draw as bursting, only while a destroy animation plays
    pub fn burst(&self) -> &[usize] {
        match self.animation {
            Some(Animation::Destroy) => &self.burst,
            _ => &[],
        }
    }

    /// Cells to draw as freshly landed, only while a gravity animation plays
    pub fn landing(&self) -> &[usize] {
        match self.animation {
            Some(Animation::Gravity) => &self.landed,
            _ => &[],
        }
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) {
        if action == Action::Back {
            self.detach();
            return;
        }
        if self.detached {
            return;
        }
        if self.intro {
            if matches!(action, Action::Select | Action::Click(_)) {
                self.intro = false;
            }
            return;
        }

        match self.state {
            GameState::Won => {
                if action == Action::Select {
                    self.next_level();
                }
            }
            GameState::Lost => {
                if action == Action::Select {
                    self.retry();
                }
            }
            GameState::Playing => match action {
                Action::Up => self.move_cursor(-1, 0),
                Action::Down => self.move_cursor(1, 0),
                Action::Left => self.move_cursor(0, -1),
                Action::Right => self.move_cursor(0, 1),
                Action::Select => self.select(self.cursor),
                Action::Click(index) => {
                    if index < CELL_COUNT {
                        self.cursor = index;
                    }
                    self.select(index);
                }
                Action::Swipe { from, to } => self.swipe(from, to),
                Action::Shuffle => self.use_shuffle(),
                Action::ColorBomb => self.toggle_color_bomb(),
                Action::Back => {}
            },
        }
    }

    /// Advance queued work (call every frame)
    pub fn update(&mut self, now: Instant) {
        if let Some(at) = self.resume_at {
            if now < at {
                return;
            }
            self.resume_at = None;
            self.animation = None;
        }
        if let Some(animation) = self.run() {
            self.animation = Some(animation);
            self.resume_at = Some(now + animation.duration(self.speed));
        }
    }

    /// Give up the session; no further mutation happens
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        info!(level = self.level_index + 1, points = self.score.points, "left the game");
        self.detached = true;
        self.queue.clear();
        self.cascade.abort();
        self.animation = None;
        self.resume_at = None;
        self.selected = None;
        self.targeting = false;
    }

    /// Replay a lost level with the boosters it started with
    pub fn retry(&mut self) {
        if self.state != GameState::Lost || self.detached {
            return;
        }
        self.boosters = self.snapshot;
        self.persist();
        self.start_level(self.level_index);
    }

    /// Move on after a win; the final level starts a new run
    pub fn next_level(&mut self) {
        if self.state != GameState::Won || self.detached {
            return;
        }
        let next = if Level::is_final(self.level_index) {
            0
        } else {
            self.level_index + 1
        };
        self.start_level(next);
    }

    /// Arm the colour eraser, or disarm it at no cost
    pub fn toggle_color_bomb(&mut self) {
        if self.targeting {
            self.targeting = false;
            debug!("colour eraser cancelled");
            return;
        }
        if !self.accepts_input() || self.boosters.color_bomb == 0 {
            return;
        }
        self.targeting = true;
        self.selected = None;
    }

    /// Shuffle every tile on the board
    pub fn use_shuffle(&mut self) {
        if !self.accepts_input() || self.boosters.shuffle == 0 {
            return;
        }
        self.boosters.shuffle -= 1;
        self.persist();
        self.selected = None;
        info!(left = self.boosters.shuffle, "shuffle used");
        self.queue
            .extend([Step::Shuffle, Step::StartCascade(Vec::new())]);
    }

    fn accepts_input(&self) -> bool {
        !self.detached
            && !self.intro
            && self.state == GameState::Playing
            && self.moves_left > 0
            && !self.is_processing()
    }

    fn move_cursor(&mut self, d_row: i32, d_col: i32) {
        let (row, col) = Board::position(self.cursor);
        let last = GRID_SIZE as i32 - 1;
        let row = (row as i32 + d_row).clamp(0, last) as usize;
        let col = (col as i32 + d_col).clamp(0, last) as usize;
        self.cursor = Board::index(row, col);
    }

    /// Tap a cell
    fn select(&mut self, index: usize) {
        if !self.accepts_input() || index >= CELL_COUNT {
            debug!(index, "tap ignored");
            return;
        }
        if self.targeting {
            self.erase(index);
            return;
        }

        match self.selected.take() {
            None => self.selected = Some(index),
            Some(first) if first == index => {}
            Some(first) if !Board::are_adjacent(first, index) => self.selected = Some(index),
            Some(first) => self.swap(first, index),
        }
    }

    /// A drag swaps straight away, whatever was selected before
    fn swipe(&mut self, from: usize, to: usize) {
        if self.targeting || !Board::are_adjacent(from, to) {
            debug!(from, to, "swipe ignored");
            return;
        }
        if !self.accepts_input() {
            return;
        }
        self.cursor = to;
        self.selected = None;
        self.swap(from, to);
    }

    fn swap(&mut self, first: usize, second: usize) {
        if let Some(combo) = combo::classify(&self.board, first, second) {
            self.consume_move();
            self.queue.extend([
                Step::Merge,
                Step::Blast {
                    combo,
                    center: first,
                },
                Step::Gravity,
                Step::StartCascade(vec![first, second]),
            ]);
        } else {
            self.queue.extend([
                Step::Swap { a: first, b: second },
                Step::CheckSwap { a: first, b: second },
            ]);
        }
    }

    fn erase(&mut self, index: usize) {
        if self.board.get(index).is_none_or(|cell| cell.is_empty()) {
            return;
        }
        self.targeting = false;
        self.boosters.color_bomb = self.boosters.color_bomb.saturating_sub(1);
        self.persist();
        info!(left = self.boosters.color_bomb, "colour eraser used");
        self.queue.extend([
            Step::Erase { index },
            Step::Gravity,
            Step::StartCascade(vec![index]),
        ]);
    }

    fn consume_move(&mut self) {
        self.moves_left = self.moves_left.saturating_sub(1);
    }

    /// Work through the queue until an animation has to play
    fn run(&mut self) -> Option<Animation> {
        while let Some(step) = self.queue.pop_front() {
            if self.detached || self.state != GameState::Playing {
                self.queue.clear();
                self.cascade.abort();
                return None;
            }
            if let Some(animation) = self.execute(step) {
                return Some(animation);
            }
        }

        if !self.detached && self.state == GameState::Playing && self.moves_left == 0 {
            info!(level = self.level_index + 1, points = self.score.points, "out of moves");
            self.state = GameState::Lost;
        }
        None
    }

    fn execute(&mut self, step: Step) -> Option<Animation> {
        match step {
            Step::Swap { a, b } => {
                self.board.swap(a, b);
                Some(Animation::Swap)
            }
            Step::CheckSwap { a, b } => {
                if has_match(&self.board) {
                    self.consume_move();
                    self.queue.push_front(Step::StartCascade(vec![a, b]));
                    None
                } else {
                    debug!(a, b, "no match, swap reverted");
                    self.board.swap(a, b);
                    Some(Animation::Swap)
                }
            }
            Step::Merge => Some(Animation::Merge),
            Step::Blast { combo, center } => {
                let seeds = combo::prime(&mut self.board, combo, center);
                self.burst = destroy(&mut self.board, &seeds, &mut self.spawner);
                info!(combo = combo.name(), cleared = self.burst.len(), "combination");
                self.award(ClearKind::Combo {
                    combo,
                    cells: self.burst.len(),
                });
                Some(Animation::Destroy)
            }
            Step::Erase { index } => {
                let cell = self.board.get(index)?;
                let seeds = self.board.matching(&cell);
                self.burst = destroy(&mut self.board, &seeds, &mut self.spawner);
                self.award(ClearKind::ColorEraser {
                    cells: self.burst.len(),
                });
                Some(Animation::Destroy)
            }
            Step::Shuffle => {
                self.spawner.shuffle(self.board.cells_mut());
                Some(Animation::Shuffle)
            }
            Step::Gravity => {
                self.burst.clear();
                self.landed = apply_gravity(&mut self.board, &mut self.spawner).landed();
                Some(Animation::Gravity)
            }
            Step::StartCascade(priority) => {
                self.cascade.start(priority);
                self.queue.push_front(Step::Cascade);
                None
            }
            Step::Cascade => match self.cascade.advance(&mut self.board, &mut self.spawner) {
                Signal::Wait(animation) => {
                    self.burst = self.cascade.cleared().to_vec();
                    self.landed = self.cascade.landed().to_vec();
                    self.queue.push_front(Step::Cascade);
                    Some(animation)
                }
                Signal::Scored(round) => {
                    self.queue.push_front(Step::Cascade);
                    self.award(ClearKind::Cascade {
                        round: round.number,
                        cells: round.cleared,
                        created: round.created,
                    });
                    None
                }
                Signal::Done => None,
            },
        }
    }

    /// Add points and check for the win
    fn award(&mut self, kind: ClearKind) {
        self.last_action = Some(self.score.add_clear(&kind));
        if self.score.points >= self.level.target {
            info!(level = self.level_index + 1, points = self.score.points, "level complete");
            self.state = GameState::Won;
            self.queue.clear();
            self.cascade.abort();
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.boosters) {
            warn!(error = %e, "failed to save boosters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booster::{MemoryStore, StoreError};
    use crate::tile::TileType::{Candy as C, Strawberry as S};
    use crate::tile::{Cell, Special, TileType};
    use std::collections::HashMap;

    /// Rows alternate cake/donut and milkshake/ice cream: no single swap matches
    const QUAD: &str = "
        K D K D K D K D
        M I M I M I M I
        K D K D K D K D
        M I M I M I M I
        K D K D K D K D
        M I M I M I M I
        K D K D K D K D
        M I M I M I M I";

    /// A candy swap from (2, 2) down to (3, 2) completes a row of four
    const FOUR_RUN: &str = "
        K D K D K D K D
        M I M I M I M I
        K D C D K D K D
        C C M C M I M I
        K D K D K D K D
        M I M I M I M I
        K D K D K D K D
        M I M I M I M I";

    fn game_on(layout: &str) -> Game {
        let mut game = Game::with_spawner(Box::new(MemoryStore::new()), Spawner::with_seed(7), 0);
        game.board = layout.parse().unwrap();
        game.intro = false;
        game
    }

    fn settle(game: &mut Game) {
        for _ in 0..10_000 {
            game.update(Instant::now());
            if !game.is_processing() {
                return;
            }
        }
        panic!("game never settled");
    }

    fn tap(game: &mut Game, row: usize, col: usize) {
        game.process_action(Action::Click(Board::index(row, col)));
    }

    fn swap(game: &mut Game, a: (usize, usize), b: (usize, usize)) {
        tap(game, a.0, a.1);
        tap(game, b.0, b.1);
        settle(game);
    }

    /// Swap two charged tiles and stop once the combination has gone off
    fn detonate(game: &mut Game, a: (usize, usize), b: (usize, usize)) {
        game.level.target = 100_000;
        tap(game, a.0, a.1);
        tap(game, b.0, b.1);
        let now = Instant::now();
        game.update(now);
        assert_eq!(game.animation(), Some(Animation::Merge));
        game.update(now);
        assert_eq!(game.animation(), Some(Animation::Destroy));
    }

    /// Store whose writes always fail
    struct ReadOnlyStore;

    impl BoosterStore for ReadOnlyStore {
        fn load(&self) -> Boosters {
            Boosters::default()
        }

        fn save(&mut self, _: &Boosters) -> Result<(), StoreError> {
            Err(StoreError::NoConfigDir)
        }
    }

    #[test]
    fn test_swap_without_match_is_reverted() {
        let mut game = game_on(QUAD);
        game.board.set(Board::index(0, 0), Cell::candy(S));
        game.board.set(Board::index(0, 1), Cell::candy(S));
        game.board.set(Board::index(0, 3), Cell::candy(S));
        let before = game.board.clone();

        swap(&mut game, (5, 5), (5, 6));
        assert_eq!(game.board, before);
        assert_eq!(game.moves_left, 15);
        assert_eq!(game.score.points, 0);
        assert_eq!(game.selected, None);
        assert_eq!(game.state, GameState::Playing);
    }

    #[test]
    fn test_four_in_a_row_leaves_stripe_on_swapped_cell() {
        let mut game = game_on(FOUR_RUN);
        game.spawner.preload([S, C, S]);

        swap(&mut game, (2, 2), (3, 2));
        assert_eq!(game.score.points, 3 * 10 + 60);
        assert_eq!(game.moves_left, 14);
        assert_eq!(
            game.board.get(Board::index(3, 2)),
            Some(Cell::special(C, Special::StripedVertical))
        );
        assert_eq!(game.last_action.as_deref(), Some("Striped!"));
        assert_eq!(game.board.vacant_count(), 0);
        assert_eq!(game.state, GameState::Playing);
    }

    #[test]
    fn test_double_bomb_clears_five_by_five() {
        let mut game = game_on(QUAD);
        game.board.set(Board::index(4, 4), Cell::special(TileType::Cake, Special::AreaBomb));
        game.board.set(Board::index(4, 5), Cell::special(TileType::Donut, Special::AreaBomb));

        swap(&mut game, (4, 4), (4, 5));
        // 25 cells at 30 each wins level 1 before the board refills
        assert_eq!(game.moves_left, 14);
        assert_eq!(game.score.points, 25 * 30);
        assert_eq!(game.state, GameState::Won);
        assert_eq!(game.board.vacant_count(), 25);
        for index in Board::square(Board::index(4, 4), 2) {
            assert_eq!(game.board.get(index), Some(Cell::Empty));
        }
    }

    #[test]
    fn test_double_bomb_in_corner_is_clipped() {
        let mut game = game_on(QUAD);
        game.board.set(0, Cell::special(TileType::Cake, Special::AreaBomb));
        game.board.set(1, Cell::special(TileType::Donut, Special::AreaBomb));
        // Columns 0..=2 lose rows 0..=2, refilled column by column
        game.spawner.preload([S, C, S, C, S, C, S, C, S]);

        swap(&mut game, (0, 0), (0, 1));
        assert_eq!(game.score.points, 9 * 30);
        assert_eq!(game.moves_left, 14);
        assert_eq!(game.board.vacant_count(), 0);
        assert_eq!(game.board.get(Board::index(1, 1)), Some(Cell::candy(S)));
        assert_eq!(game.state, GameState::Playing);
    }

    #[test]
    fn test_color_eraser_wipes_one_type() {
        let mut game = game_on(QUAD);
        let spots = [
            (0, 0), (0, 2), (0, 4), (0, 6),
            (2, 1), (2, 3), (2, 5), (2, 7),
            (4, 0), (4, 2), (4, 4), (4, 6),
        ];
        for (r, c) in spots {
            game.board.set(Board::index(r, c), Cell::candy(S));
        }
        assert_eq!(game.board.indices_of(S).len(), 12);
        // Even columns refill two cells, odd columns one
        game.spawner.preload([C, S, S, C, S, S, C, S, S, C, S, S]);

        game.process_action(Action::ColorBomb);
        assert!(game.targeting);
        tap(&mut game, 0, 0);
        assert!(!game.targeting);
        settle(&mut game);

        assert_eq!(game.score.points, 12 * 20);
        assert_eq!(game.boosters.color_bomb, 0);
        assert_eq!(game.store.load().color_bomb, 0);
        assert_eq!(game.moves_left, 15);
        assert_eq!(game.board.vacant_count(), 0);
        assert_eq!(game.board.indices_of(S).len(), 8);
    }

    #[test]
    fn test_color_eraser_cancel_is_free() {
        let mut game = game_on(QUAD);
        game.process_action(Action::ColorBomb);
        game.process_action(Action::ColorBomb);
        assert!(!game.targeting);
        assert_eq!(game.boosters.color_bomb, 1);

        game.boosters.color_bomb = 0;
        game.process_action(Action::ColorBomb);
        assert!(!game.targeting);
    }

    #[test]
    fn test_lost_level_retry_restores_boosters() {
        let mut game = Game::with_spawner(Box::new(MemoryStore::new()), Spawner::with_seed(3), 0);
        // Counts carried over from earlier levels
        game.boosters = Boosters { shuffle: 2, color_bomb: 3 };
        game.start_level(1);
        assert_eq!(game.boosters, Boosters { shuffle: 2, color_bomb: 3 });
        game.board = FOUR_RUN.parse().unwrap();
        game.board.set(0, Cell::candy(S));
        game.intro = false;
        game.spawner.preload([C]);
        game.spawner.preload([S, C, S]);

        // Spend a booster on the lone strawberry
        game.process_action(Action::ColorBomb);
        tap(&mut game, 0, 0);
        settle(&mut game);
        assert_eq!(game.boosters.color_bomb, 2);
        assert_eq!(game.score.points, 20);

        // Last move scores but falls short of 1000
        game.moves_left = 1;
        swap(&mut game, (2, 2), (3, 2));
        assert_eq!(game.score.points, 110);
        assert_eq!(game.moves_left, 0);
        assert_eq!(game.state, GameState::Lost);

        game.process_action(Action::Select);
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.level_index, 1);
        assert_eq!(game.moves_left, 20);
        assert_eq!(game.score.points, 0);
        assert_eq!(game.boosters, Boosters { shuffle: 2, color_bomb: 3 });
        assert_eq!(game.store.load(), Boosters { shuffle: 2, color_bomb: 3 });
    }

    #[test]
    fn test_win_beats_running_out_of_moves() {
        let mut game = game_on(FOUR_RUN);
        game.spawner.preload([S, C, S]);
        game.level.target = 90;
        game.moves_left = 1;

        swap(&mut game, (2, 2), (3, 2));
        assert_eq!(game.moves_left, 0);
        assert_eq!(game.state, GameState::Won);
    }

    #[test]
    fn test_shuffle_conserves_tiles() {
        let mut game = game_on(QUAD);
        game.board.set(3, Cell::special(TileType::Milkshake, Special::StripedHorizontal));
        game.board.set(40, Cell::Rainbow);
        let count = |board: &Board| {
            let mut counts: HashMap<Cell, usize> = HashMap::new();
            for cell in board.cells() {
                *counts.entry(*cell).or_default() += 1;
            }
            counts
        };
        let before = count(&game.board);

        game.process_action(Action::Shuffle);
        game.update(Instant::now());
        assert_eq!(game.animation(), Some(Animation::Shuffle));
        assert_eq!(count(&game.board), before);
        assert_eq!(game.boosters.shuffle, 0);
        assert_eq!(game.moves_left, 15);

        // Nothing left to shuffle with
        settle(&mut game);
        let board = game.board.clone();
        game.process_action(Action::Shuffle);
        settle(&mut game);
        assert_eq!(game.board, board);
    }

    #[test]
    fn test_input_ignored_while_processing() {
        let mut game = game_on(FOUR_RUN);
        game.spawner.preload([S, C, S]);
        tap(&mut game, 2, 2);
        tap(&mut game, 3, 2);
        game.update(Instant::now());
        assert!(game.is_processing());

        tap(&mut game, 6, 6);
        game.process_action(Action::Shuffle);
        assert_eq!(game.selected, None);
        assert_eq!(game.boosters.shuffle, 1);
        settle(&mut game);
        assert_eq!(game.moves_left, 14);
    }

    #[test]
    fn test_selection_rules() {
        let mut game = game_on(QUAD);
        tap(&mut game, 1, 1);
        assert_eq!(game.selected, Some(Board::index(1, 1)));
        // Same cell again deselects
        tap(&mut game, 1, 1);
        assert_eq!(game.selected, None);
        // A far cell replaces the selection without a move
        tap(&mut game, 1, 1);
        tap(&mut game, 5, 5);
        assert_eq!(game.selected, Some(Board::index(5, 5)));
        assert_eq!(game.moves_left, 15);
        assert!(!game.is_processing());
    }

    #[test]
    fn test_keyboard_cursor_is_clamped() {
        let mut game = game_on(QUAD);
        game.process_action(Action::Up);
        game.process_action(Action::Left);
        assert_eq!(game.cursor, 0);
        for _ in 0..20 {
            game.process_action(Action::Down);
            game.process_action(Action::Right);
        }
        assert_eq!(game.cursor, CELL_COUNT - 1);
        game.process_action(Action::Select);
        assert_eq!(game.selected, Some(CELL_COUNT - 1));
    }

    #[test]
    fn test_intro_swallows_first_tap() {
        let mut game = Game::with_spawner(Box::new(MemoryStore::new()), Spawner::with_seed(1), 0);
        assert!(game.intro);
        game.process_action(Action::Shuffle);
        assert_eq!(game.boosters.shuffle, 1);
        game.process_action(Action::Select);
        assert!(!game.intro);
        assert_eq!(game.selected, None);
    }

    #[test]
    fn test_back_detaches_for_good() {
        let mut game = game_on(FOUR_RUN);
        tap(&mut game, 2, 2);
        tap(&mut game, 3, 2);
        game.process_action(Action::Back);
        assert!(game.is_detached());
        let board = game.board.clone();
        settle(&mut game);
        tap(&mut game, 0, 0);
        assert_eq!(game.board, board);
        assert_eq!(game.moves_left, 15);
        assert_eq!(game.selected, None);
    }

    #[test]
    fn test_level_zero_resets_boosters() {
        let store = MemoryStore::with(Boosters { shuffle: 5, color_bomb: 0 });
        let game = Game::with_spawner(Box::new(store), Spawner::with_seed(1), 0);
        assert_eq!(game.boosters, Boosters::default());
        assert_eq!(game.store.load(), Boosters::default());
        assert_eq!(game.board.vacant_count(), 0);
    }

    #[test]
    fn test_progression_carries_boosters() {
        let mut game = game_on(QUAD);
        game.boosters.color_bomb = 0;
        game.persist();
        game.state = GameState::Won;
        game.process_action(Action::Select);
        assert_eq!(game.level_index, 1);
        assert_eq!(game.moves_left, 20);
        assert_eq!(game.boosters.color_bomb, 0);
        assert!(game.intro);

        // Winning the last level starts over with fresh boosters
        game.start_level(4);
        game.state = GameState::Won;
        game.next_level();
        assert_eq!(game.level_index, 0);
        assert_eq!(game.boosters, Boosters::default());
    }

    #[test]
    fn test_rainbow_with_plain_wipes_the_colour() {
        let mut game = game_on(QUAD);
        let rainbow = Board::index(3, 3);
        game.board.set(rainbow, Cell::Rainbow);

        detonate(&mut game, (3, 3), (3, 4));
        assert_eq!(game.moves_left, 14);
        // 16 milkshakes at 20 each, the rainbow itself scores nothing
        assert_eq!(game.burst().len(), 16);
        assert!(!game.burst().contains(&rainbow));
        assert_eq!(game.score.points, 16 * 20);
        assert_eq!(game.board.get(rainbow), Some(Cell::Empty));
        assert!(game.board.indices_of(TileType::Milkshake).is_empty());
        assert_eq!(game.last_action.as_deref(), Some("Colour Wipe!"));

        settle(&mut game);
        assert_eq!(game.board.vacant_count(), 0);
        assert_eq!(game.state, GameState::Playing);
    }

    #[test]
    fn test_rainbow_with_stripe_stripes_the_colour() {
        let mut game = game_on(QUAD);
        let rainbow = Board::index(3, 3);
        game.board.set(rainbow, Cell::Rainbow);
        game.board.set(
            Board::index(3, 4),
            Cell::special(TileType::Milkshake, Special::StripedVertical),
        );

        detonate(&mut game, (3, 3), (3, 4));
        assert_eq!(game.moves_left, 14);
        // Every milkshake clears its column: columns 0, 2, 4 and 6
        assert_eq!(game.burst().len(), 32);
        assert!(!game.burst().contains(&rainbow));
        assert_eq!(game.score.points, 32 * 20);
        assert_eq!(game.last_action.as_deref(), Some("Rainbow Blast!"));

        settle(&mut game);
        assert_eq!(game.board.vacant_count(), 0);
    }

    #[test]
    fn test_two_stripes_clear_a_cross() {
        let mut game = game_on(QUAD);
        game.board.set(
            Board::index(4, 4),
            Cell::special(TileType::Cake, Special::StripedHorizontal),
        );
        game.board.set(
            Board::index(3, 4),
            Cell::special(TileType::Milkshake, Special::StripedVertical),
        );

        detonate(&mut game, (4, 4), (3, 4));
        assert_eq!(game.moves_left, 14);
        // Row 4 plus column 4 through the first tile
        assert_eq!(game.burst().len(), 15);
        assert_eq!(game.score.points, 15 * 20);
        assert_eq!(game.last_action.as_deref(), Some("Cross!"));

        settle(&mut game);
        assert_eq!(game.board.vacant_count(), 0);
    }

    #[test]
    fn test_bomb_and_stripe_clear_three_lines_each_way() {
        let mut game = game_on(QUAD);
        game.board.set(Board::index(4, 4), Cell::special(TileType::Cake, Special::AreaBomb));
        game.board.set(
            Board::index(3, 4),
            Cell::special(TileType::Milkshake, Special::StripedVertical),
        );

        detonate(&mut game, (4, 4), (3, 4));
        assert_eq!(game.moves_left, 14);
        // Rows 3..=5 and columns 3..=5, the 9 shared cells counted once
        assert_eq!(game.burst().len(), 39);
        assert_eq!(game.score.points, 39 * 25);
        assert_eq!(game.last_action.as_deref(), Some("Super Cross!"));

        settle(&mut game);
        assert_eq!(game.board.vacant_count(), 0);
    }

    #[test]
    fn test_spent_booster_stays_spent_when_store_fails() {
        let mut game = Game::with_spawner(Box::new(ReadOnlyStore), Spawner::with_seed(7), 0);
        game.board = QUAD.parse().unwrap();
        game.board.set(0, Cell::candy(S));
        game.intro = false;
        game.spawner.preload([C]);

        game.process_action(Action::ColorBomb);
        tap(&mut game, 0, 0);
        settle(&mut game);
        assert_eq!(game.score.points, 20);
        assert_eq!(game.boosters.color_bomb, 0);

        game.state = GameState::Won;
        game.next_level();
        assert_eq!(game.level_index, 1);
        assert_eq!(game.boosters, Boosters { shuffle: 1, color_bomb: 0 });
    }

    #[test]
    fn test_swipe_swaps_without_selecting() {
        let mut game = game_on(FOUR_RUN);
        game.spawner.preload([S, C, S]);
        tap(&mut game, 6, 6);

        game.process_action(Action::Swipe {
            from: Board::index(2, 2),
            to: Board::index(3, 2),
        });
        settle(&mut game);
        assert_eq!(game.score.points, 90);
        assert_eq!(game.moves_left, 14);
        assert_eq!(game.selected, None);
        assert_eq!(game.cursor, Board::index(3, 2));

        // Only neighbours can be swiped
        let board = game.board.clone();
        game.process_action(Action::Swipe { from: 0, to: 2 });
        settle(&mut game);
        assert_eq!(game.board, board);
        assert_eq!(game.moves_left, 14);
    }

    #[test]
    fn test_landing_cells_only_during_gravity() {
        let mut game = game_on(FOUR_RUN);
        game.spawner.preload([S, C, S]);
        tap(&mut game, 2, 2);
        tap(&mut game, 3, 2);

        let now = Instant::now();
        let mut landed = Vec::new();
        for _ in 0..100 {
            game.update(now);
            match game.animation() {
                Some(Animation::Gravity) => landed = game.landing().to_vec(),
                _ => assert!(game.landing().is_empty()),
            }
            if !game.is_processing() {
                break;
            }
        }

        // Columns 0, 1 and 3 each drop three tiles and take one new one
        let mut expected: Vec<usize> = [0, 1, 3]
            .into_iter()
            .flat_map(|col| (0..4).map(move |row| Board::index(row, col)))
            .collect();
        expected.sort_unstable();
        landed.sort_unstable();
        assert_eq!(landed, expected);
    }
}
