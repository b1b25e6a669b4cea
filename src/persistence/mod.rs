//! Best-score persistence
//!
//! The engine only sees the [`BestScoreStore`] capability. Storage is
//! best-effort: a failed read counts as no best score yet and a failed write
//! is logged and dropped, so persistence can never end a game.

pub mod best_score;

pub use best_score::{BestScoreStore, FileScoreStore, MemoryScoreStore};
