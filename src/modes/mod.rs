pub mod autoplay;
pub mod human;

pub use autoplay::{AutoplayMode, AutoplayReport, GreedyPilot};
pub use human::HumanMode;
