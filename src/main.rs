mod game;
mod grid;
mod input;
mod session;
mod snake;
mod term;

use std::{fs::File, sync::Arc};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub type TermInt = u16;
pub type TermCoords = (TermInt, TermInt);

/// Signed so a step off the board is still representable.
pub type GridInt = i16;
pub type Coords = (GridInt, GridInt);

const LOG_FILE: &str = "snake.log";
const LOG_FILTER: &str = "snake_session=debug";

fn main() -> Result<()> {
    // Log to a file so nothing ends up on the game screen
    let log_file = File::create(LOG_FILE).with_context(|| format!("creating {}", LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(LOG_FILTER))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    tracing::info!("starting snake");

    let mut game = game::SnakeGame::new()?;
    game.run()
}
