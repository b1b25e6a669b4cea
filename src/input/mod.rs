//! Translation of terminal events into game actions

pub mod handler;
pub mod pointer;

pub use handler::{InputHandler, KeyAction};
pub use pointer::{ControlPad, Gesture, PointerHandler, SwipeDetector};
