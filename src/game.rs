use std::time::{Duration, Instant};

use crate::input::{KeyAction, map_key};
use crate::session::{GameSession, Mode};
use crate::snake::Direction::{self, *};
use crate::term::TermManager;

use anyhow::Result;
use crossterm::event::Event;
use crossterm::style::Color;
use tracing::info;

const TICK_INTERVAL_MS: u64 = 140;

const FOOD_COLOR: Color = Color::Red;
const SNAKE_COLOR: Color = Color::Green;

const RULES: &[&str] = &[
    "Snake Game Rules and Controls",
    "",
    "Arrow keys or WASD to move",
    "Eat the red food to grow",
    "and score points",
    "Avoid the walls and your own body",
    "",
    "Press any key to start",
    "Ctrl+C to quit",
];

/// Wires a [`GameSession`] to the terminal and a fixed-interval timer.
pub struct SnakeGame {
    session: GameSession,
    term: TermManager,
}

impl SnakeGame {
    pub fn new() -> Result<Self> {
        let session = GameSession::new();
        let term = TermManager::new(session.grid())?;
        Ok(SnakeGame { session, term })
    }

    /// Runs until the player quits. The terminal is restored even if the
    /// game loop fails.
    pub fn run(&mut self) -> Result<()> {
        guarded(
            self,
            |game| game.term.setup(),
            |game| game.play(),
            |game| game.term.restore(),
        )
    }

    fn play(&mut self) -> Result<()> {
        let tick = Duration::from_millis(TICK_INTERVAL_MS);
        let mut last_tick = Instant::now();

        self.render()?;

        loop {
            let timeout = tick.saturating_sub(last_tick.elapsed());

            match self.term.poll_event(timeout)? {
                Some(Event::Key(key_ev)) => match map_key(&key_ev) {
                    Some(KeyAction::Quit) => {
                        info!(score = self.session.score(), "quit");
                        return Ok(());
                    }
                    Some(KeyAction::Game(input)) => {
                        let before = self.session.mode();
                        self.session.handle_input(input);

                        // A new game gets a full interval before its first step
                        if entered_running(before, self.session.mode()) {
                            last_tick = Instant::now();
                        }
                        self.render()?;
                    }
                    None => {}
                },
                Some(Event::Resize(width, height)) => {
                    self.term.resize((width, height))?;
                    self.render()?;
                }
                _ => {}
            }

            if last_tick.elapsed() >= tick {
                last_tick = Instant::now();
                if self.session.mode() == Mode::Running {
                    self.session.tick();
                    self.render()?;
                }
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        self.term.draw_borders()?;
        self.term.clear_board()?;

        match self.session.mode() {
            Mode::Rules => self.term.show_message(RULES)?,
            Mode::Running => {
                self.term.paint_cell(self.session.food(), FOOD_COLOR, "  ")?;
                for pos in self.session.snake().iter().skip(1) {
                    self.term.paint_cell(*pos, SNAKE_COLOR, "  ")?;
                }
                let head = self.session.snake()[0];
                self.term.paint_cell(head, SNAKE_COLOR, head_glyph(self.session.direction()))?;
                self.term.print_status(&format!("Score: {}", self.session.score()))?;
            }
            Mode::GameOver => {
                let score = format!("Score: {}", self.session.score());
                self.term.show_message(&[
                    "Game Over",
                    score.as_str(),
                    "",
                    "Press any key to restart",
                    "Ctrl+C to quit",
                ])?;
            }
        }

        self.term.flush()
    }
}

fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Up => "^^",
        Down => "vv",
        Left => "<<",
        Right => ">>",
    }
}

fn entered_running(before: Mode, after: Mode) -> bool {
    before != Mode::Running && after == Mode::Running
}

/// Runs `body` between `setup` and `restore`. `restore` runs even when
/// `setup` fails part way, and the first error wins.
fn guarded<S>(
    state: &mut S,
    setup: impl FnOnce(&mut S) -> Result<()>,
    body: impl FnOnce(&mut S) -> Result<()>,
    restore: impl FnOnce(&mut S) -> Result<()>,
) -> Result<()> {
    let res = setup(&mut *state).and_then(|()| body(&mut *state));
    let restored = restore(&mut *state);
    res.and(restored)
}
