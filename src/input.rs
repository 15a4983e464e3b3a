use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::Input;
use crate::snake::Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Game(Input),
}

/// Only presses count. Repeats and releases map to `None`.
pub fn map_key(ev: &KeyEvent) -> Option<KeyAction> {
    if ev.kind != KeyEventKind::Press {
        return None;
    }

    if is_ctrl_c(ev) {
        return Some(KeyAction::Quit);
    }

    let input = match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Input::Turn(Up),
        KeyCode::Char('a') | KeyCode::Left => Input::Turn(Left),
        KeyCode::Char('s') | KeyCode::Down => Input::Turn(Down),
        KeyCode::Char('d') | KeyCode::Right => Input::Turn(Right),
        _ => Input::AnyKey,
    };
    Some(KeyAction::Game(input))
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
