use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::grid::Grid;
use crate::snake::{Direction, MoveResult, Snake};
use crate::{Coords, GridInt};

pub const INITIAL_LENGTH: GridInt = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Rules,
    Running,
    GameOver,
}

/// Everything the input source can tell the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    AnyKey,
}

/// One game of snake: the board, the snake on it, and which screen we're on.
///
/// All mutation goes through [`start`](Self::start),
/// [`set_direction`](Self::set_direction), [`handle_any_key`](Self::handle_any_key)
/// and [`tick`](Self::tick). Callers are expected to serialize these calls.
pub struct GameSession<R = StdRng> {
    grid: Grid,
    snake: Snake,
    food: Coords,
    score: u32,
    mode: Mode,
    rng: R,
}

impl GameSession<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameSession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(rng: R) -> Self {
        let grid = Grid::default();
        let mut session = GameSession {
            grid,
            snake: Snake::new(grid.center(), INITIAL_LENGTH, Direction::Up),
            food: (0, 0),
            score: 0,
            mode: Mode::Rules,
            rng,
        };
        session.reset_board();
        session
    }

    /// Throws away the current game and starts a fresh one.
    pub fn start(&mut self) {
        self.reset_board();
        self.mode = Mode::Running;
        info!(head = ?self.snake.head(), food = ?self.food, "game started");
    }

    /// Single entry point for the input source.
    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Turn(direction) => self.set_direction(direction),
            Input::AnyKey => self.handle_any_key(),
        }
    }

    pub fn set_direction(&mut self, requested: Direction) {
        if self.mode != Mode::Running {
            self.start();
            return;
        }

        if self.snake.set_direction(requested) {
            debug!(direction = ?requested, "direction changed");
        }
    }

    pub fn handle_any_key(&mut self) {
        if self.mode != Mode::Running {
            self.start();
        }
    }

    /// Advances the game by one step. Does nothing unless a game is running.
    pub fn tick(&mut self) {
        if self.mode != Mode::Running {
            return;
        }

        match self.snake.move_step(self.food, &self.grid) {
            MoveResult::Ate { new_head } => {
                self.score += 1;
                debug!(at = ?new_head, score = self.score, "food eaten");

                match self.spawn_food() {
                    Some(food) => self.food = food,
                    None => {
                        warn!(score = self.score, "no free cell left for food");
                        self.mode = Mode::GameOver;
                    }
                }
            }
            MoveResult::Moved { new_head, old_tail } => {
                trace!(head = ?new_head, freed = ?old_tail, "moved");
            }
            MoveResult::Crashed(crash) => {
                info!(reason = ?crash, score = self.score, length = self.snake.len(), "game over");
                self.mode = Mode::GameOver;
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Snake cells, head first.
    pub fn snake(&self) -> &VecDeque<Coords> {
        self.snake.cells()
    }

    pub fn food(&self) -> Coords {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction()
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    ///////////////////////////////////////////////////////////////////////////

    fn reset_board(&mut self) {
        self.snake = Snake::new(self.grid.center(), INITIAL_LENGTH, Direction::Up);
        self.score = 0;
        // A fresh snake on a 20x20 grid always leaves free cells.
        if let Some(food) = self.spawn_food() {
            self.food = food;
        }
    }

    /// Uniform pick among the cells the snake doesn't cover.
    fn spawn_food(&mut self) -> Option<Coords> {
        let snake = &self.snake;
        let choices: Vec<Coords> = self.grid.cells().filter(|pos| !snake.occupies(*pos)).collect();
        let food = choices.choose(&mut self.rng).copied();
        debug!(food = ?food, free = choices.len(), "food spawned");
        food
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::snake::Direction::*;

    fn running(seed: u64) -> GameSession {
        let mut session = GameSession::with_seed(seed);
        session.start();
        session
    }

    fn assert_running_invariants(session: &GameSession) {
        let cells: HashSet<Coords> = session.snake().iter().copied().collect();
        assert_eq!(cells.len(), session.snake().len(), "snake overlaps itself");
        assert!(!cells.contains(&session.food()), "food under the snake");
        assert!(session.grid().contains(session.food()));
        assert!(session.snake().iter().all(|pos| session.grid().contains(*pos)));
    }

    #[test]
    fn starts_on_the_rules_screen() {
        let mut session = GameSession::with_seed(1);
        assert_eq!(session.mode(), Mode::Rules);

        let before: Vec<Coords> = session.snake().iter().copied().collect();
        session.tick();
        assert_eq!(session.mode(), Mode::Rules);
        assert_eq!(session.snake().iter().copied().collect::<Vec<_>>(), before);
    }

    #[test]
    fn any_key_leaves_the_rules_screen() {
        let mut session = GameSession::with_seed(1);
        session.handle_input(Input::AnyKey);
        assert_eq!(session.mode(), Mode::Running);
    }

    #[test]
    fn arrow_on_rules_screen_only_starts() {
        let mut session = GameSession::with_seed(1);
        session.set_direction(Left);
        assert_eq!(session.mode(), Mode::Running);
        assert_eq!(session.direction(), Up);
    }

    #[test]
    fn start_lays_out_a_vertical_snake() {
        let session = running(2);
        let cells: Vec<Coords> = session.snake().iter().copied().collect();
        assert_eq!(cells, vec![(10, 10), (10, 11), (10, 12), (10, 13), (10, 14)]);
        assert_eq!(session.direction(), Up);
        assert_eq!(session.score(), 0);
        assert_running_invariants(&session);
    }

    #[test]
    fn opposite_direction_is_ignored() {
        let mut session = running(3);
        session.set_direction(Down);
        assert_eq!(session.direction(), Up);

        session.set_direction(Right);
        assert_eq!(session.direction(), Right);
        session.set_direction(Left);
        assert_eq!(session.direction(), Right);
    }

    #[test]
    fn last_turn_before_a_tick_wins() {
        let mut session = running(3);
        session.food = (0, 0);
        session.set_direction(Left);
        session.set_direction(Up);
        session.tick();
        assert_eq!(session.snake()[0], (10, 9));
    }

    #[test]
    fn any_key_is_ignored_while_running() {
        let mut session = running(4);
        session.food = (0, 0);
        session.tick();
        session.handle_any_key();
        assert_eq!(session.mode(), Mode::Running);
        assert_eq!(session.snake()[0], (10, 9));
    }

    #[test]
    fn normal_step_moves_without_growing() {
        let mut session = running(5);
        session.snake = Snake::from_cells(vec![(5, 5), (4, 5), (3, 5)], Right);
        session.food = (9, 9);

        session.tick();

        let cells: Vec<Coords> = session.snake().iter().copied().collect();
        assert_eq!(cells, vec![(6, 5), (5, 5), (4, 5)]);
        assert_eq!(session.mode(), Mode::Running);
        assert_eq!(session.food(), (9, 9));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut session = running(6);
        session.food = (10, 9);

        session.tick();

        assert_eq!(session.snake().len(), INITIAL_LENGTH as usize + 1);
        assert_eq!(session.snake()[0], (10, 9));
        assert_eq!(session.score(), 1);
        assert_ne!(session.food(), (10, 9));
        assert_running_invariants(&session);
    }

    #[test]
    fn wall_ends_the_game_and_freezes_the_snake() {
        let mut session = running(7);
        session.snake = Snake::from_cells(vec![(0, 4), (1, 4), (2, 4)], Left);
        session.food = (9, 9);
        let before = session.snake().clone();

        session.tick();

        assert_eq!(session.mode(), Mode::GameOver);
        assert_eq!(session.snake(), &before);
    }

    #[test]
    fn running_into_the_body_ends_the_game() {
        let mut session = running(8);
        session.snake = Snake::from_cells(vec![(5, 5), (5, 6), (6, 6), (6, 5), (6, 4)], Right);
        session.food = (9, 9);

        session.tick();

        assert_eq!(session.mode(), Mode::GameOver);
    }

    #[test]
    fn chasing_the_tail_is_still_a_crash() {
        let mut session = running(8);
        session.snake = Snake::from_cells(vec![(5, 5), (5, 6), (6, 6), (6, 5)], Right);
        session.food = (9, 9);

        session.tick();

        assert_eq!(session.mode(), Mode::GameOver);
    }

    #[test]
    fn game_over_ignores_ticks() {
        let mut session = running(9);
        session.snake = Snake::from_cells(vec![(0, 4), (1, 4)], Left);
        session.food = (9, 9);
        session.tick();
        assert_eq!(session.mode(), Mode::GameOver);

        let before = session.snake().clone();
        session.tick();
        assert_eq!(session.mode(), Mode::GameOver);
        assert_eq!(session.snake(), &before);
    }

    #[test]
    fn any_input_after_game_over_resets() {
        let mut session = running(10);
        session.food = (10, 9);
        session.tick();
        assert_eq!(session.score(), 1);

        session.snake = Snake::from_cells(vec![(0, 4), (1, 4)], Left);
        session.food = (9, 9);
        session.tick();
        assert_eq!(session.mode(), Mode::GameOver);

        session.set_direction(Right);

        assert_eq!(session.mode(), Mode::Running);
        assert_eq!(session.score(), 0);
        assert_eq!(session.direction(), Up);
        let cells: Vec<Coords> = session.snake().iter().copied().collect();
        assert_eq!(cells, vec![(10, 10), (10, 11), (10, 12), (10, 13), (10, 14)]);
        assert_running_invariants(&session);
    }

    #[test]
    fn food_lands_on_the_last_free_cell() {
        let mut session = running(11);
        let grid = session.grid();
        let (food, head, last_free) = ((0, 0), (1, 0), (19, 19));
        let body = grid.cells().filter(|pos| ![food, head, last_free].contains(pos));
        session.snake = Snake::from_cells(std::iter::once(head).chain(body), Left);
        session.food = food;

        session.tick();

        assert_eq!(session.mode(), Mode::Running);
        assert_eq!(session.food(), last_free);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn filling_the_board_ends_the_game() {
        let mut session = running(12);
        let grid = session.grid();
        let (food, head) = ((0, 0), (1, 0));
        let body = grid.cells().filter(|pos| ![food, head].contains(pos));
        session.snake = Snake::from_cells(std::iter::once(head).chain(body), Left);
        session.food = food;

        session.tick();

        assert_eq!(session.mode(), Mode::GameOver);
        assert_eq!(session.score(), 1);
        assert_eq!(session.snake().len(), 400);
    }

    #[test]
    fn random_play_keeps_invariants() {
        let mut session = running(13);
        let mut driver = StdRng::seed_from_u64(99);
        let directions = [Up, Down, Left, Right];
        let mut last_score = 0;
        let mut games = 0;

        for _ in 0..5_000 {
            if session.mode() == Mode::GameOver {
                session.handle_any_key();
                assert_eq!(session.score(), 0);
                last_score = 0;
                games += 1;
            }

            if driver.gen_bool(0.3) {
                let dir = *directions.choose(&mut driver).unwrap();
                session.set_direction(dir);
            }
            session.tick();

            assert!(session.score() >= last_score);
            last_score = session.score();
            if session.mode() == Mode::Running {
                assert_running_invariants(&session);
            }
        }

        assert!(games > 0);
    }

    #[test]
    fn same_seed_same_food() {
        let a = running(42);
        let b = running(42);
        assert_eq!(a.food(), b.food());
    }
}
