use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::{MissedTickBehavior, interval};

use crate::game::{Action, GameConfig, GameEngine, RunPhase};
use crate::input::{InputHandler, KeyAction, PointerHandler};
use crate::metrics::GameMetrics;
use crate::persistence::BestScoreStore;
use crate::render::Renderer;

/// Refresh rate of the frame loop (~60 Hz)
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Per-frame fade of the food pulse
const PULSE_DECAY: f32 = 0.9;

pub struct HumanMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    pointer: PointerHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, store: impl BestScoreStore + 'static) -> Self {
        Self::with_engine(GameEngine::new(config, store))
    }

    pub fn with_engine(engine: GameEngine) -> Self {
        Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            pointer: PointerHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        tracing::info!(best = self.engine.best(), "interactive session started");

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        tracing::info!(
            games = self.metrics.games_played,
            best = self.engine.best(),
            "interactive session ended"
        );

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // One tick attempt and one render per frame; the engine decides
        // whether a move is due.
        let mut frame_timer = interval(FRAME_INTERVAL);
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Frame: tick, then draw
                _ = frame_timer.tick() => {
                    self.update_game(Instant::now());
                    let snapshot = self.engine.snapshot();
                    let renderer = &mut self.renderer;
                    let metrics = &self.metrics;
                    terminal.draw(|frame| {
                        renderer.render(frame, &snapshot, metrics);
                    }).context("Failed to draw frame")?;
                    self.engine.decay_pulse(PULSE_DECAY);
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }

                match self.input_handler.handle_key_event(key) {
                    KeyAction::GameAction(action) => self.apply(action, Instant::now()),
                    KeyAction::Quit => self.should_quit = true,
                    KeyAction::None => {}
                }
            }
            Event::Mouse(mouse) => {
                let pad = self.renderer.control_pad();
                if let Some(action) = self.pointer.handle_mouse_event(mouse, pad) {
                    self.apply(action, Instant::now());
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Turn(direction) => self.engine.queue_direction(direction),
            Action::TogglePause => self.engine.toggle_pause(now),
            Action::Start => {
                self.engine.start();
                self.metrics.on_game_start();
            }
        }
    }

    fn update_game(&mut self, now: Instant) {
        let outcome = self.engine.tick(now);
        self.metrics.record(outcome);
        self.metrics
            .update(now, self.engine.phase() == RunPhase::Running);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};
    use crate::persistence::MemoryScoreStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mode() -> HumanMode {
        let engine = GameEngine::with_seed(GameConfig::default(), MemoryScoreStore::new(), 11);
        HumanMode::with_engine(engine)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert_eq!(mode.engine.phase(), RunPhase::NotStarted);
        assert_eq!(mode.engine.score(), 0);
    }

    #[test]
    fn test_enter_starts_game() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));
        assert_eq!(mode.engine.phase(), RunPhase::Running);
    }

    #[test]
    fn test_space_pauses_and_resumes() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));

        mode.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(mode.engine.phase(), RunPhase::Paused);

        mode.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(mode.engine.phase(), RunPhase::Running);
    }

    #[test]
    fn test_turn_applies_on_next_frame() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));
        mode.engine.state_mut().food = Position::new(0, 0);

        mode.handle_event(key(KeyCode::Down));
        let t0 = Instant::now();
        mode.update_game(t0);
        assert_eq!(mode.engine.state().snake.direction, Direction::Right);

        mode.update_game(t0 + mode.engine.current_tick_interval());

        assert_eq!(mode.engine.state().snake.direction, Direction::Down);
        assert_eq!(mode.engine.state().snake.head(), Position::new(11, 12));
    }

    #[test]
    fn test_game_reset() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));
        mode.engine.state_mut().score = 10;
        mode.engine.state_mut().phase = RunPhase::Over;

        mode.handle_event(key(KeyCode::Char('r')));

        assert_eq!(mode.engine.score(), 0);
        assert_eq!(mode.engine.phase(), RunPhase::Running);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char('q')));
        assert!(mode.should_quit);
    }
}
