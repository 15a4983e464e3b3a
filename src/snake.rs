use std::collections::VecDeque;

use crate::grid::Grid;
use crate::{Coords, GridInt};
use Direction::*;
use MoveResult::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// One-cell step in this direction. Y grows downwards.
    pub fn offset(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Crash {
    Wall,
    Body,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Ate { new_head: Coords },
    Moved { new_head: Coords, old_tail: Coords },
    Crashed(Crash),
}

/// Head-first body plus the direction it travels in.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Coords>,
    direction: Direction,
}

impl Snake {
    pub fn new(head: Coords, size: GridInt, direction: Direction) -> Self {
        let diff = direction.offset();

        let body = (0..size.max(1))
            .map(|i| (head.0 - diff.0 * i, head.1 - diff.1 * i))
            .collect();
        Snake { body, direction }
    }

    pub fn cells(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn head(&self) -> Coords {
        // The body is never empty: `new` builds at least one cell and
        // `move_step` only removes a cell after adding one.
        self.body[0]
    }

    pub fn tail(&self) -> Coords {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Reversing straight into the neck is ignored.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction == self.direction.opposite() {
            return false;
        }
        self.direction = new_direction;
        true
    }

    pub fn next_head(&self) -> Coords {
        let head = self.head();
        let diff = self.direction.offset();
        (head.0 + diff.0, head.1 + diff.1)
    }

    pub fn move_step(&mut self, food: Coords, grid: &Grid) -> MoveResult {
        let new_head = self.next_head();

        if new_head == food {
            self.body.push_front(new_head);
            return Ate { new_head };
        }

        if !grid.contains(new_head) {
            return Crashed(Crash::Wall);
        }

        // Checked against the whole body, tail included, even though the
        // tail would move out of the way on this same step.
        if self.occupies(new_head) {
            return Crashed(Crash::Body);
        }

        let old_tail = self.tail();
        self.body.push_front(new_head);
        self.body.pop_back();
        Moved { new_head, old_tail }
    }

    #[cfg(test)]
    pub(crate) fn from_cells(cells: impl IntoIterator<Item = Coords>, direction: Direction) -> Self {
        let body: VecDeque<Coords> = cells.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one cell");
        Snake { body, direction }
    }
}
