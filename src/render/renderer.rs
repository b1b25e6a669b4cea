use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{self, Action, GameOverReason, Position, RunPhase, Snapshot};
use crate::input::ControlPad;
use crate::metrics::GameMetrics;

/// Food is drawn emphasised while the pulse is above this
const PULSE_HIGHLIGHT: f32 = 0.3;

pub struct Renderer {
    control_pad: ControlPad,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            control_pad: ControlPad::new(),
        }
    }

    /// Buttons drawn on the last frame, for mouse hit testing
    pub fn control_pad(&self) -> &ControlPad {
        &self.control_pad
    }

    pub fn render(&mut self, frame: &mut Frame, snapshot: &Snapshot, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(2), // Control pad and help
            ])
            .split(frame.area());

        let stats = self.render_stats(snapshot, metrics);
        frame.render_widget(stats, chunks[0]);

        // Two columns per cell plus the border
        let cells = u16::try_from(snapshot.grid_size).unwrap_or(u16::MAX);
        let board_width = cells.saturating_mul(2).saturating_add(2);
        let board_height = cells.saturating_add(2);
        let board_area = centered(chunks[1], board_width, board_height);

        let grid = self.render_grid(snapshot);
        frame.render_widget(grid, board_area);

        if let Some(overlay) = self.render_overlay(snapshot) {
            let overlay_area = centered(board_area, board_width.min(34), 7);
            frame.render_widget(Clear, overlay_area);
            frame.render_widget(overlay, overlay_area);
        }

        let footer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(chunks[2]);

        self.render_control_pad(frame, footer[0], snapshot.phase);
        frame.render_widget(self.render_controls(), footer[1]);
    }

    fn render_grid(&self, snapshot: &Snapshot) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(snapshot.grid_size);
        let head = snapshot.snake.head();

        for y in 0..snapshot.grid_size {
            let mut spans = Vec::with_capacity(snapshot.grid_size);

            for x in 0..snapshot.grid_size {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::LightCyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if snapshot.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Cyan))
                } else if pos == snapshot.food {
                    food_span(snapshot.pulse)
                } else {
                    Span::styled("· ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Neon Snake "),
        )
    }

    fn render_stats(&self, snapshot: &Snapshot, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(snapshot.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(snapshot.best.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format_speed(snapshot.speed), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_overlay(&self, snapshot: &Snapshot) -> Option<Paragraph<'_>> {
        let title_style = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);
        let hint = Style::default().fg(Color::Gray);

        let (lines, border) = match snapshot.phase {
            RunPhase::Running => return None,
            RunPhase::NotStarted => (
                vec![
                    Line::from(Span::styled("NEON SNAKE", title_style(Color::LightCyan))),
                    Line::from(""),
                    Line::from(Span::styled("Press Enter to begin.", hint)),
                ],
                Color::Cyan,
            ),
            RunPhase::Paused => (
                vec![
                    Line::from(Span::styled("PAUSED", title_style(Color::White))),
                    Line::from(""),
                    Line::from(Span::styled("Space to resume", hint)),
                ],
                Color::White,
            ),
            RunPhase::Over => {
                let mut lines = vec![
                    Line::from(Span::styled("GAME OVER", title_style(Color::Red))),
                    Line::from(vec![
                        Span::styled("Final score: ", Style::default().fg(Color::Yellow)),
                        Span::styled(snapshot.score.to_string(), title_style(Color::White)),
                    ]),
                ];
                if snapshot.over_reason == Some(GameOverReason::BoardFilled) {
                    lines.push(Line::from(Span::styled(
                        "The board is full!",
                        title_style(Color::Green),
                    )));
                }
                lines.push(Line::from(vec![
                    Span::styled("Press ", hint),
                    Span::styled("Enter", title_style(Color::Green)),
                    Span::styled(" to play again", hint),
                ]));
                (lines, Color::Red)
            }
        };

        Some(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            ),
        )
    }

    /// Draw the clickable buttons and remember where they are
    fn render_control_pad(&mut self, frame: &mut Frame, area: Rect, phase: RunPhase) {
        self.control_pad.clear();

        let pause_label = if phase == RunPhase::Paused {
            "Resume"
        } else {
            "Pause"
        };
        let buttons = [
            ("◀", Action::Turn(game::Direction::Left)),
            ("▲", Action::Turn(game::Direction::Up)),
            ("▼", Action::Turn(game::Direction::Down)),
            ("▶", Action::Turn(game::Direction::Right)),
            ("Start", Action::Start),
            (pause_label, Action::TogglePause),
        ];

        let labels: Vec<Line> = buttons
            .iter()
            .map(|(label, _)| Line::from(format!("[ {label} ]")))
            .collect();
        let total_width: u16 = labels.iter().map(|l| l.width() as u16 + 1).sum();

        let mut x = area.x + area.width.saturating_sub(total_width) / 2;
        for (line, (_, action)) in labels.into_iter().zip(buttons) {
            let width = (line.width() as u16).min(area.right().saturating_sub(x));
            if width == 0 || area.height == 0 {
                break;
            }

            let rect = Rect::new(x, area.y, width, 1);
            let style = match action {
                Action::Turn(_) => Style::default().fg(Color::Cyan),
                Action::Start => Style::default().fg(Color::Green),
                Action::TogglePause => Style::default().fg(Color::Yellow),
            };
            frame.render_widget(Paragraph::new(line).style(style), rect);
            self.control_pad.add(rect, action);

            x = x.saturating_add(width + 1);
        }
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let key = Style::default().fg(Color::Cyan);
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", key),
            Span::raw(" or "),
            Span::styled("WASD", key),
            Span::raw(" to move | "),
            Span::styled("Space", key),
            Span::raw(" pause | "),
            Span::styled("Enter", key),
            Span::raw(" start | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn food_span(pulse: f32) -> Span<'static> {
    if pulse > PULSE_HIGHLIGHT {
        Span::styled(
            "◆ ",
            Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "● ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    }
}

/// Speed multiplier as shown in the header, e.g. `1.2x`
pub fn format_speed(speed: f64) -> String {
    format!("{:.1}x", speed)
}

/// A `width` × `height` rectangle centered in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameEngine};
    use crate::persistence::MemoryScoreStore;
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(engine: &GameEngine, renderer: &mut Renderer) -> String {
        let backend = TestBackend::new(80, 34);
        let mut terminal = Terminal::new(backend).unwrap();
        let metrics = GameMetrics::new();
        terminal
            .draw(|frame| renderer.render(frame, &engine.snapshot(), &metrics))
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(1.0), "1.0x");
        assert_eq!(format_speed(130.0 / 72.0), "1.8x");
    }

    #[test]
    fn test_centered() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered(area, 20, 10), Rect::new(30, 7, 20, 10));
        assert_eq!(centered(area, 100, 30), area);
    }

    #[test]
    fn test_start_screen() {
        let engine = GameEngine::with_seed(GameConfig::default(), MemoryScoreStore::new(), 5);
        let mut renderer = Renderer::new();
        let screen = draw(&engine, &mut renderer);

        assert!(screen.contains("NEON SNAKE"));
        assert!(screen.contains("Score: 0"));
        assert!(screen.contains("Speed: 1.0x"));
    }

    #[test]
    fn test_running_board_shows_snake() {
        let mut engine =
            GameEngine::with_seed(GameConfig::default(), MemoryScoreStore::with_best(70), 5);
        engine.reset();
        let mut renderer = Renderer::new();
        let screen = draw(&engine, &mut renderer);

        assert!(!screen.contains("NEON SNAKE"));
        assert!(screen.contains('■'));
        assert!(screen.contains("Best: 70"));
    }

    #[test]
    fn test_control_pad_recorded() {
        let engine = GameEngine::with_seed(GameConfig::default(), MemoryScoreStore::new(), 5);
        let mut renderer = Renderer::new();
        draw(&engine, &mut renderer);

        let buttons = renderer.control_pad().buttons();
        assert_eq!(buttons.len(), 6);

        let (start_rect, _) = buttons
            .iter()
            .find(|(_, action)| *action == Action::Start)
            .unwrap();
        assert_eq!(
            renderer.control_pad().hit(start_rect.x, start_rect.y),
            Some(Action::Start)
        );
    }
}
