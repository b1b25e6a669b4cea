//! Mouse input: swipe gestures and clicks on the on-screen control pad

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::game::{Action, Direction};

/// Minimum displacement for a swipe on a pixel-based touch surface
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 14.0;

/// Minimum displacement for a mouse drag in the terminal, in grid cells
pub const TERMINAL_SWIPE_THRESHOLD: f32 = 2.0;

/// Grid cells are drawn two columns wide
const COLUMNS_PER_CELL: f32 = 2.0;

/// Result of a completed press/release pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Displacement reached the threshold
    Swipe(Direction),
    /// Released close to where it started
    Tap,
}

/// Turns a press and a release into a swipe direction
///
/// The axis with the larger absolute displacement wins; a displacement below
/// the threshold on both axes is a tap.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    threshold: f32,
    start: Option<(f32, f32)>,
}

impl SwipeDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Finish the gesture; `None` if no press was recorded
    pub fn end(&mut self, x: f32, y: f32) -> Option<Gesture> {
        let (start_x, start_y) = self.start.take()?;
        let dx = x - start_x;
        let dy = y - start_y;
        let (abs_x, abs_y) = (dx.abs(), dy.abs());

        if abs_x.max(abs_y) < self.threshold {
            return Some(Gesture::Tap);
        }

        let direction = if abs_x > abs_y {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };

        Some(Gesture::Swipe(direction))
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

/// Clickable buttons laid out by the renderer on the last frame
#[derive(Debug, Clone, Default)]
pub struct ControlPad {
    buttons: Vec<(Rect, Action)>,
}

impl ControlPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.buttons.clear();
    }

    pub fn add(&mut self, area: Rect, action: Action) {
        self.buttons.push((area, action));
    }

    pub fn buttons(&self) -> &[(Rect, Action)] {
        &self.buttons
    }

    /// Action of the button under the given terminal cell
    pub fn hit(&self, column: u16, row: u16) -> Option<Action> {
        let position = Position::new(column, row);
        self.buttons
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, action)| *action)
    }
}

/// Maps raw terminal mouse events to game actions
#[derive(Debug, Clone)]
pub struct PointerHandler {
    swipe: SwipeDetector,
}

impl PointerHandler {
    pub fn new() -> Self {
        Self {
            swipe: SwipeDetector::new(TERMINAL_SWIPE_THRESHOLD),
        }
    }

    pub fn handle_mouse_event(&mut self, event: MouseEvent, pad: &ControlPad) -> Option<Action> {
        let x = f32::from(event.column) / COLUMNS_PER_CELL;
        let y = f32::from(event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.swipe.begin(x, y);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => match self.swipe.end(x, y)? {
                Gesture::Swipe(direction) => Some(Action::Turn(direction)),
                Gesture::Tap => pad.hit(event.column, event.row),
            },
            _ => None,
        }
    }
}

impl Default for PointerHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_swipe_axis_selection() {
        let mut swipe = SwipeDetector::default();

        swipe.begin(100.0, 100.0);
        assert_eq!(
            swipe.end(140.0, 110.0),
            Some(Gesture::Swipe(Direction::Right))
        );

        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(60.0, 90.0), Some(Gesture::Swipe(Direction::Left)));

        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(95.0, 130.0), Some(Gesture::Swipe(Direction::Down)));

        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(110.0, 50.0), Some(Gesture::Swipe(Direction::Up)));
    }

    #[test]
    fn test_swipe_below_threshold_is_tap() {
        let mut swipe = SwipeDetector::default();

        swipe.begin(10.0, 10.0);
        assert_eq!(swipe.end(23.0, 0.0), Some(Gesture::Tap));

        swipe.begin(10.0, 10.0);
        assert_eq!(swipe.end(24.0, 10.0), Some(Gesture::Swipe(Direction::Right)));
    }

    #[test]
    fn test_equal_displacement_picks_vertical() {
        let mut swipe = SwipeDetector::default();
        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.end(-20.0, -20.0), Some(Gesture::Swipe(Direction::Up)));
    }

    #[test]
    fn test_end_without_begin() {
        let mut swipe = SwipeDetector::default();
        assert_eq!(swipe.end(50.0, 50.0), None);

        swipe.begin(0.0, 0.0);
        swipe.cancel();
        assert_eq!(swipe.end(50.0, 50.0), None);
    }

    #[test]
    fn test_control_pad_hit() {
        let mut pad = ControlPad::new();
        pad.add(Rect::new(10, 5, 3, 1), Action::Turn(Direction::Up));
        pad.add(Rect::new(20, 5, 7, 1), Action::TogglePause);

        assert_eq!(pad.hit(11, 5), Some(Action::Turn(Direction::Up)));
        assert_eq!(pad.hit(26, 5), Some(Action::TogglePause));
        assert_eq!(pad.hit(13, 5), None);
        assert_eq!(pad.hit(11, 6), None);

        pad.clear();
        assert_eq!(pad.hit(11, 5), None);
    }

    #[test]
    fn test_pointer_drag_turns() {
        let mut pointer = PointerHandler::new();
        let pad = ControlPad::new();

        let down = mouse(MouseEventKind::Down(MouseButton::Left), 10, 10);
        assert_eq!(pointer.handle_mouse_event(down, &pad), None);

        // 8 columns is 4 cells to the left
        let up = mouse(MouseEventKind::Up(MouseButton::Left), 2, 11);
        assert_eq!(
            pointer.handle_mouse_event(up, &pad),
            Some(Action::Turn(Direction::Left))
        );
    }

    #[test]
    fn test_pointer_click_uses_pad() {
        let mut pointer = PointerHandler::new();
        let mut pad = ControlPad::new();
        pad.add(Rect::new(4, 20, 7, 1), Action::Start);

        let down = mouse(MouseEventKind::Down(MouseButton::Left), 5, 20);
        let up = mouse(MouseEventKind::Up(MouseButton::Left), 6, 20);
        pointer.handle_mouse_event(down, &pad);
        assert_eq!(pointer.handle_mouse_event(up, &pad), Some(Action::Start));

        let down = mouse(MouseEventKind::Down(MouseButton::Left), 30, 2);
        let up = mouse(MouseEventKind::Up(MouseButton::Left), 30, 2);
        pointer.handle_mouse_event(down, &pad);
        assert_eq!(pointer.handle_mouse_event(up, &pad), None);
    }

    #[test]
    fn test_pointer_ignores_other_buttons() {
        let mut pointer = PointerHandler::new();
        let pad = ControlPad::new();

        let right = mouse(MouseEventKind::Down(MouseButton::Right), 0, 0);
        assert_eq!(pointer.handle_mouse_event(right, &pad), None);
        let up = mouse(MouseEventKind::Up(MouseButton::Left), 40, 0);
        assert_eq!(pointer.handle_mouse_event(up, &pad), None);
    }
}
