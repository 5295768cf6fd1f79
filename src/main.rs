//! SWEETSWAP - a match-3 puzzle for the terminal
//!
//! Swap neighbouring sweets, line up three or more, chase the level target
//! before the moves run out.

mod board;
mod booster;
mod cascade;
mod combo;
mod destroy;
mod game;
mod gravity;
mod icons;
mod input;
mod level;
mod matcher;
mod resolver;
mod score;
mod settings;
mod spawner;
mod tile;
mod ui;

use booster::JsonBoosterStore;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use game::Game;
use icons::TerminalIcons;
use input::InputHandler;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use settings::Settings;
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the sweetswap temp directory, creating it if needed
fn sweetswap_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("sweetswap");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to a per-session log file; the terminal belongs to the game
    let log_dir = sweetswap_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = match "sweetswap=debug".parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "SWEETSWAP starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    tracing::debug!("Settings: {:?}", settings);
    let store = JsonBoosterStore::in_config_dir();
    let mut game = Game::new(Box::new(store), settings.gameplay.animation_speed);

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &mut game, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    // Write back so a fresh config file shows every option
    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if result.is_ok() {
        println!("\n🍓 Thanks for playing SWEETSWAP! 🍓");
        println!(
            "Level: {} | Score: {} / {}",
            game.level_index + 1,
            game.score.points,
            game.level.target
        );
        println!(
            "Boosters left: {} shuffle, {} eraser",
            game.boosters.shuffle, game.boosters.color_bomb
        );
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    settings: &Settings,
) -> io::Result<()> {
    let mut input = InputHandler::from_settings(settings);
    let icons = TerminalIcons::new(settings.visual.glyphs);

    loop {
        terminal.draw(|frame| ui::render_game(frame, game, settings, &icons))?;

        if event::poll(FRAME_DURATION)? {
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input.key_down(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let board = ui::board_inner(Rect::new(0, 0, size.width, size.height));
                    input.mouse(mouse, board)
                }
                _ => None,
            };
            if let Some(action) = action {
                game.process_action(action);
            }
        }

        game.update(Instant::now());

        if game.is_detached() {
            return Ok(());
        }
    }
}
