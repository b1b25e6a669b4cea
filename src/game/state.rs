use std::time::Duration;

use super::action::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Reduce both coordinates into `0..grid_size`, wrapping around the edges
    pub fn wrapped(&self, grid_size: usize) -> Self {
        let n = grid_size as i32;
        Self {
            x: self.x.rem_euclid(n),
            y: self.y.rem_euclid(n),
        }
    }

    /// Step one cell in a direction on a wrapping grid
    pub fn step(&self, direction: Direction, grid_size: usize) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy).wrapped(grid_size)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Direction committed on the last tick
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with its body trailing behind the head
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if any segment, head included, sits on `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Push a new head; drop the tail unless the snake grows
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Coarse lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Paused,
    Over,
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// The head ran into the snake's own body
    SelfCollision,
    /// The snake covers every cell, so no food can be placed
    BoardFilled,
}

/// Mutable state of the current game
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Direction queued by input, committed at the start of the next tick
    pub pending_direction: Direction,
    pub food: Position,
    pub grid_size: usize,
    pub score: u32,
    pub phase: RunPhase,
    pub over_reason: Option<GameOverReason>,
    /// Rendering-only intensity, set to 1.0 when food is eaten
    pub pulse: f32,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Position, grid_size: usize) -> Self {
        let pending_direction = snake.direction;
        Self {
            snake,
            pending_direction,
            food,
            grid_size,
            score: 0,
            phase: RunPhase::NotStarted,
            over_reason: None,
            pulse: 0.0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let n = self.grid_size as i32;
        pos.x >= 0 && pos.x < n && pos.y >= 0 && pos.y < n
    }
}

/// Read-only view handed to the renderer once per frame
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub snake: &'a Snake,
    pub food: Position,
    pub grid_size: usize,
    pub score: u32,
    pub best: u32,
    pub phase: RunPhase,
    pub over_reason: Option<GameOverReason>,
    pub tick_interval: Duration,
    /// `base_tick / tick_interval`
    pub speed: f64,
    pub pulse: f32,
}
