//! File-backed stores for games and player statistics.

/// Game files keyed by id.
pub mod games;
/// Combined per-player statistics record.
pub mod players;

pub use games::{GameRepository, SaveKind};
pub use players::{PlayerIndex, PlayerStats};
