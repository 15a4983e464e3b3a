use crate::grid::Grid;
use crate::{Coords, GridInt, TermCoords, TermInt};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{Context, Result, ensure};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, poll, read};
use tracing::warn;

/// Terminal characters are about twice as tall as they are wide, so one grid
/// cell takes two columns to look square.
const CELL_COLUMNS: TermInt = 2;

/// Where the board sits in a terminal of a given size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    pub board_width: TermInt,
    pub board_height: TermInt,
    // Top-left corner of the border
    pub origin: TermCoords,
}

/// Centers the bordered board in a `term_size` terminal. Fails if it doesn't fit.
pub fn board_layout(grid: Grid, term_size: TermCoords) -> Result<BoardLayout> {
    let (width, height) = term_size;

    let board_width = grid.width() as TermInt * CELL_COLUMNS + 2;
    let board_height = grid.height() as TermInt + 2;
    ensure!(
        width >= board_width && height >= board_height,
        "terminal is {}x{}, the board needs at least {}x{}",
        width, height, board_width, board_height
    );

    let origin = ((width - board_width) / 2, (height - board_height) / 2);
    Ok(BoardLayout { board_width, board_height, origin })
}

fn origin_after_resize(grid: Grid, term_size: TermCoords) -> TermCoords {
    match board_layout(grid, term_size) {
        Ok(layout) => layout.origin,
        Err(e) => {
            warn!(error = %e, "terminal too small after resize");
            (0, 0)
        }
    }
}

/// Draws a fixed-size board centered in the terminal.
pub struct TermManager {
    stdout: Stdout,
    grid: Grid,
    board_width: TermInt,
    board_height: TermInt,
    origin: TermCoords,
}

impl TermManager {
    pub fn new(grid: Grid) -> Result<Self> {
        let size = terminal::size().context("reading terminal size")?;
        let BoardLayout { board_width, board_height, origin } = board_layout(grid, size)?;
        Ok(TermManager { stdout: stdout(), grid, board_width, board_height, origin })
    }

    /// Re-centers the board after the terminal changed size. A terminal that
    /// got too small keeps the board pinned to the top-left corner.
    pub fn resize(&mut self, term_size: TermCoords) -> Result<()> {
        self.origin = origin_after_resize(self.grid, term_size);
        queue!(self.stdout, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("entering alt screen")?;
        terminal::enable_raw_mode().context("enabling raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("disabling raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("leaving alt screen")?;
        Ok(())
    }

    /// Waits up to `timeout` for the next terminal event.
    pub fn poll_event(&self, timeout: Duration) -> Result<Option<Event>> {
        if !poll(timeout)? {
            return Ok(None);
        }
        Ok(Some(read()?))
    }

    pub fn draw_borders(&mut self) -> Result<()> {
        let (left, top) = self.origin;
        let right = left + self.board_width - 1;
        let bottom = top + self.board_height - 1;

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            self.print_at((x, top), ch)?;
            self.print_at((x, bottom), ch)?;
        }

        for y in top + 1..bottom {
            self.print_at((left, y), '|')?;
            self.print_at((right, y), '|')?;
        }

        Ok(())
    }

    /// Blanks every cell inside the border.
    pub fn clear_board(&mut self) -> Result<()> {
        let blank = " ".repeat((self.board_width - 2) as usize);
        for row in 0..self.board_height - 2 {
            let (x, y) = self.board_to_term((0, row as GridInt));
            queue!(self.stdout, cursor::MoveTo(x, y), style::Print(&blank))?;
        }
        Ok(())
    }

    /// Fills one grid cell. `text` should be `CELL_COLUMNS` wide.
    pub fn paint_cell(&mut self, pos: Coords, color: Color, text: &str) -> Result<()> {
        let (x, y) = self.board_to_term(pos);
        queue!(
            self.stdout,
            cursor::MoveTo(x, y),
            style::SetBackgroundColor(color),
            style::SetForegroundColor(Color::Black),
            style::Print(text),
            style::ResetColor
        )?;
        Ok(())
    }

    /// Writes `text` over the top border, left-aligned.
    pub fn print_status(&mut self, text: &str) -> Result<()> {
        let (left, top) = self.origin;
        queue!(
            self.stdout,
            cursor::MoveTo(left + 2, top),
            style::SetForegroundColor(Color::White),
            style::Print(format!(" {} ", text)),
            style::ResetColor
        )?;
        Ok(())
    }

    /// Boxed lines centered over the board.
    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        let inner_width = self.board_width - 2;
        let inner_height = self.board_height - 2;

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap_or(0) + 2) as TermInt;
        let msg_width = msg_width.min(inner_width);
        let (left, top) = self.board_to_term((0, 0));
        let top_left = (
            left + inner_width.saturating_sub(msg_width) / 2,
            top + inner_height.saturating_sub(msg_height) / 2,
        );

        let blank = " ".repeat(msg_width as usize);
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            queue!(self.stdout, cursor::MoveTo(top_left.0, y), style::Print(&blank))?;
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            queue!(
                self.stdout,
                cursor::MoveTo(top_left.0, y),
                style::SetForegroundColor(Color::White),
                style::Print(padded_line),
                style::ResetColor
            )?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("flushing stdout")
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        Ok(())
    }

    fn board_to_term(&self, pos: Coords) -> TermCoords {
        (
            self.origin.0 + 1 + pos.0 as TermInt * CELL_COLUMNS,
            self.origin.1 + 1 + pos.1 as TermInt,
        )
    }
}
