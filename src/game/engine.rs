use super::{
    action::Direction,
    config::GameConfig,
    state::{GameOverReason, GameState, Position, RunPhase, Snake, Snapshot},
};
use crate::persistence::BestScoreStore;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::{Duration, Instant};

/// Pulse values below this are snapped to zero
const PULSE_EPSILON: f32 = 0.001;

/// What a call to [`GameEngine::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the interval has not elapsed yet
    Idle,
    /// The snake moved one cell
    Moved,
    /// The snake moved onto the food and grew
    Ate,
    /// The snake ran into itself; the game is over
    Collided,
    /// The snake ate the last free cell; the game is over
    BoardFilled,
}

/// Tick interval for a given score
///
/// `max(min_tick, base_tick - floor(score / speed_step_score) * speed_gain)`
pub fn tick_interval(config: &GameConfig, score: u32) -> Duration {
    let brackets = u64::from(score / config.speed_step_score.max(1));
    let reduction = brackets.saturating_mul(config.speed_gain_ms);
    let ms = config
        .base_tick_ms
        .saturating_sub(reduction)
        .max(config.min_tick_ms);
    Duration::from_millis(ms)
}

/// The game engine that owns all game state
///
/// A single writer drives it through [`tick`](Self::tick) and the control
/// operations; renderers only read [`snapshot`](Self::snapshot).
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    store: Box<dyn BestScoreStore>,
    state: GameState,
    best: u32,
    /// Time the current interval started; `None` until the first tick of a game
    last_move: Option<Instant>,
}

impl GameEngine {
    /// Create a new game engine with an entropy-seeded RNG
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`GameConfig::validate`].
    pub fn new(config: GameConfig, store: impl BestScoreStore + 'static) -> Self {
        Self::with_rng(config, Box::new(store), StdRng::from_entropy())
    }

    /// Create a game engine whose food placement is reproducible
    ///
    /// Panics on an invalid `config`, like [`new`](Self::new).
    pub fn with_seed(
        config: GameConfig,
        store: impl BestScoreStore + 'static,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, Box::new(store), StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: Box<dyn BestScoreStore>, rng: StdRng) -> Self {
        if let Err(err) = config.validate() {
            panic!("invalid game configuration: {err}");
        }

        let best = store.get();
        let snake = Self::starting_snake(&config);
        let head = snake.head();
        let state = GameState::new(snake, head, config.grid_size);

        let mut engine = Self {
            config,
            rng,
            store,
            state,
            best,
            last_move: None,
        };
        engine.place_food();
        engine
    }

    fn starting_snake(config: &GameConfig) -> Snake {
        let center = (config.grid_size / 2) as i32;
        Snake::new(
            Position::new(center, center),
            Direction::Right,
            config.initial_snake_length,
        )
    }

    /// Start a fresh game
    pub fn reset(&mut self) {
        let snake = Self::starting_snake(&self.config);
        self.state = GameState::new(snake, Position::new(0, 0), self.config.grid_size);
        self.place_food();
        self.state.phase = RunPhase::Running;
        self.last_move = None;

        tracing::info!(
            grid_size = self.config.grid_size,
            best = self.best,
            "new game started"
        );
    }

    /// Alias of [`reset`](Self::reset) used by the start button and the Enter key
    pub fn start(&mut self) {
        self.reset();
    }

    /// Move the food to a uniformly random cell not covered by the snake
    ///
    /// Rejection sampling with no retry bound, which only stays cheap while
    /// the snake covers a small share of the board. Returns `None`, leaving
    /// the food untouched, when the snake covers every cell.
    pub fn place_food(&mut self) -> Option<Position> {
        if self.state.snake.len() >= self.config.cell_count() {
            return None;
        }

        let n = self.config.grid_size as i32;
        loop {
            let pos = Position::new(self.rng.gen_range(0..n), self.rng.gen_range(0..n));

            if !self.state.snake.occupies(pos) {
                self.state.food = pos;
                return Some(pos);
            }
        }
    }

    /// Queue a turn for the next tick
    ///
    /// Ignored when it would reverse the snake into its own neck. Only the
    /// last accepted call before a tick takes effect.
    pub fn queue_direction(&mut self, requested: Direction) {
        if requested.is_opposite(self.state.snake.direction) {
            tracing::trace!(?requested, "ignoring reversal");
            return;
        }
        self.state.pending_direction = requested;
    }

    /// Queue a turn given as a token such as `"up"`; unknown tokens are ignored
    pub fn queue_direction_token(&mut self, token: &str) {
        match token.parse::<Direction>() {
            Ok(direction) => self.queue_direction(direction),
            Err(err) => tracing::trace!("{}", err),
        }
    }

    /// Advance the game by one cell if a tick is due at `now`
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.state.phase != RunPhase::Running {
            return TickOutcome::Idle;
        }

        // The first tick of a game only starts the clock.
        let Some(last) = self.last_move else {
            self.last_move = Some(now);
            return TickOutcome::Idle;
        };

        if now.saturating_duration_since(last) < self.current_tick_interval() {
            return TickOutcome::Idle;
        }

        self.last_move = Some(now);
        self.state.snake.direction = self.state.pending_direction;

        let new_head = self
            .state
            .snake
            .head()
            .step(self.state.snake.direction, self.config.grid_size);

        // Checked against the pre-move body, tail included.
        if self.state.snake.occupies(new_head) {
            self.finish(GameOverReason::SelfCollision);
            return TickOutcome::Collided;
        }

        let ate_food = new_head == self.state.food;
        self.state.snake.advance(new_head, ate_food);

        if !ate_food {
            return TickOutcome::Moved;
        }

        self.state.score = self.state.score.saturating_add(self.config.score_increment);
        self.state.pulse = 1.0;
        tracing::debug!(
            score = self.state.score,
            len = self.state.snake.len(),
            "ate food"
        );

        if self.state.score > self.best {
            self.best = self.state.score;
            self.store.set(self.best);
        }

        if self.place_food().is_none() {
            self.finish(GameOverReason::BoardFilled);
            return TickOutcome::BoardFilled;
        }

        TickOutcome::Ate
    }

    fn finish(&mut self, reason: GameOverReason) {
        self.state.phase = RunPhase::Over;
        self.state.over_reason = Some(reason);
        tracing::info!(
            score = self.state.score,
            best = self.best,
            ?reason,
            "game over"
        );
    }

    /// Pause a running game or resume a paused one
    ///
    /// Resuming restarts the interval at `now`, so the next move waits a full
    /// tick instead of firing on time accumulated while paused.
    pub fn toggle_pause(&mut self, now: Instant) {
        match self.state.phase {
            RunPhase::Running => {
                self.state.phase = RunPhase::Paused;
                tracing::debug!("paused");
            }
            RunPhase::Paused => {
                self.state.phase = RunPhase::Running;
                self.last_move = Some(now);
                tracing::debug!("resumed");
            }
            RunPhase::NotStarted | RunPhase::Over => {}
        }
    }

    /// Current tick interval, derived from the score
    pub fn current_tick_interval(&self) -> Duration {
        tick_interval(&self.config, self.state.score)
    }

    /// How much faster than the starting pace the game runs, e.g. `1.2`
    pub fn speed_multiplier(&self) -> f64 {
        let interval = self.current_tick_interval().as_secs_f64();
        self.config.base_tick().as_secs_f64() / interval
    }

    /// Fade the food pulse; called once per rendered frame
    pub fn decay_pulse(&mut self, factor: f32) {
        self.state.pulse *= factor;
        if self.state.pulse < PULSE_EPSILON {
            self.state.pulse = 0.0;
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            snake: &self.state.snake,
            food: self.state.food,
            grid_size: self.config.grid_size,
            score: self.state.score,
            best: self.best,
            phase: self.state.phase,
            over_reason: self.state.over_reason,
            tick_interval: self.current_tick_interval(),
            speed: self.speed_multiplier(),
            pulse: self.state.pulse,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
