//! Neon Snake - a terminal snake game on a wrapping grid
//!
//! This library provides:
//! - Core game logic driven by explicit timestamps (game module)
//! - Best-score persistence behind an injectable store (persistence module)
//! - Keyboard, mouse swipe and control-pad input (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - Interactive and headless execution modes (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
