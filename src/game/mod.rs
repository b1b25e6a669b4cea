//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine is driven by explicit timestamps, so the interactive loop, the
//! headless autoplay loop and the tests all run the same code.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, TickOutcome, tick_interval};
pub use state::{GameOverReason, GameState, Position, RunPhase, Snake, Snapshot};
