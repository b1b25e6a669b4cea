use std::time::{Duration, Instant};

use crate::game::TickOutcome;

/// Session statistics shown in the header
///
/// The play clock only advances while the game is running, so time spent
/// paused or on the game-over screen is not counted.
pub struct GameMetrics {
    pub elapsed_time: Duration,
    pub games_played: u32,
    last_update: Option<Instant>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            elapsed_time: Duration::ZERO,
            games_played: 0,
            last_update: None,
        }
    }

    /// Advance the play clock to `now` if the game is running
    pub fn update(&mut self, now: Instant, running: bool) {
        if let Some(last) = self.last_update {
            if running {
                self.elapsed_time += now.saturating_duration_since(last);
            }
        }
        self.last_update = Some(now);
    }

    pub fn on_game_start(&mut self) {
        self.elapsed_time = Duration::ZERO;
        self.last_update = None;
    }

    pub fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Collided | TickOutcome::BoardFilled => self.games_played += 1,
            TickOutcome::Idle | TickOutcome::Moved | TickOutcome::Ate => {}
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
