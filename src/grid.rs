use crate::{Coords, GridInt};

pub const GRID_WIDTH: GridInt = 20;
pub const GRID_HEIGHT: GridInt = 20;

/// The fixed playing field, `width` x `height` cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Grid {
    width: GridInt,
    height: GridInt,
}

impl Grid {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        Grid { width, height }
    }

    pub fn width(&self) -> GridInt {
        self.width
    }

    pub fn height(&self) -> GridInt {
        self.height
    }

    pub fn contains(&self, pos: Coords) -> bool {
        (0..self.width).contains(&pos.0) && (0..self.height).contains(&pos.1)
    }

    pub fn center(&self) -> Coords {
        (self.width / 2, self.height / 2)
    }

    /// Every cell of the grid, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Coords> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new(GRID_WIDTH, GRID_HEIGHT)
    }
}
