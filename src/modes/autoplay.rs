//! Headless mode where a greedy pilot plays the game
//!
//! The engine runs against a virtual clock that jumps one tick interval per
//! step, so a whole game finishes in milliseconds and no terminal is needed.
//!
//! # Example
//!
//! ```rust
//! use neon_snake::game::GameConfig;
//! use neon_snake::modes::AutoplayMode;
//! use neon_snake::persistence::MemoryScoreStore;
//!
//! let mut autoplay = AutoplayMode::new(GameConfig::default(), MemoryScoreStore::new(), 42, 500);
//! let report = autoplay.run();
//! assert!(report.ticks <= 500);
//! ```

use std::time::Instant;

use crate::game::{
    Direction, GameConfig, GameEngine, GameOverReason, GameState, Position, RunPhase,
    TickOutcome,
};
use crate::persistence::BestScoreStore;

/// Summary of a finished autoplay run
#[derive(Debug, Clone, PartialEq)]
pub struct AutoplayReport {
    pub score: u32,
    pub best: u32,
    pub ticks: u64,
    pub foods_eaten: u32,
    pub snake_length: usize,
    /// `None` if the run stopped at the tick limit
    pub over_reason: Option<GameOverReason>,
}

/// Steers toward the food along the shorter way around the board
///
/// Never picks a move into an occupied cell when a free one exists. It looks
/// one step ahead only, so it can trap itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPilot;

impl GreedyPilot {
    pub fn choose(&self, state: &GameState) -> Direction {
        let head = state.snake.head();
        let current = state.snake.direction;

        Direction::ALL
            .into_iter()
            .filter(|dir| !dir.is_opposite(current))
            .map(|dir| {
                let next = head.step(dir, state.grid_size);
                let blocked = state.snake.occupies(next);
                let distance = toroidal_distance(next, state.food, state.grid_size);
                // Keep going straight on ties
                (blocked, distance, dir != current, dir)
            })
            .min_by_key(|&(blocked, distance, turning, _)| (blocked, distance, turning))
            .map(|(_, _, _, dir)| dir)
            .unwrap_or(current)
    }
}

/// Manhattan distance on a wrapping grid
pub fn toroidal_distance(a: Position, b: Position, grid_size: usize) -> u32 {
    let n = grid_size as u32;
    let axis = |p: i32, q: i32| {
        let d = p.abs_diff(q);
        d.min(n - d)
    };
    axis(a.x, b.x) + axis(a.y, b.y)
}

pub struct AutoplayMode {
    engine: GameEngine,
    pilot: GreedyPilot,
    max_ticks: u64,
}

impl AutoplayMode {
    pub fn new(
        config: GameConfig,
        store: impl BestScoreStore + 'static,
        seed: u64,
        max_ticks: u64,
    ) -> Self {
        Self {
            engine: GameEngine::with_seed(config, store, seed),
            pilot: GreedyPilot,
            max_ticks,
        }
    }

    /// Play one game until it ends or the tick limit is reached
    pub fn run(&mut self) -> AutoplayReport {
        self.engine.start();

        let mut now = Instant::now();
        let mut ticks = 0u64;
        let mut foods_eaten = 0u32;

        while ticks < self.max_ticks && self.engine.phase() == RunPhase::Running {
            let direction = self.pilot.choose(self.engine.state());
            self.engine.queue_direction(direction);

            match self.engine.tick(now) {
                TickOutcome::Idle => {}
                TickOutcome::Ate => {
                    foods_eaten += 1;
                    ticks += 1;
                    tracing::debug!(
                        ticks,
                        score = self.engine.score(),
                        interval_ms = self.engine.current_tick_interval().as_millis() as u64,
                        "pilot ate food"
                    );
                }
                TickOutcome::Moved | TickOutcome::Collided | TickOutcome::BoardFilled => {
                    ticks += 1;
                }
            }

            now += self.engine.current_tick_interval();
        }

        let state = self.engine.state();
        let report = AutoplayReport {
            score: state.score,
            best: self.engine.best(),
            ticks,
            foods_eaten,
            snake_length: state.snake.len(),
            over_reason: state.over_reason,
        };

        tracing::info!(
            score = report.score,
            ticks = report.ticks,
            length = report.snake_length,
            reason = ?report.over_reason,
            "autoplay finished"
        );

        report
    }
}
