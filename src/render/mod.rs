//! Terminal rendering of engine snapshots

pub mod renderer;

pub use renderer::{Renderer, format_speed};
