//! Performance statistics over a player's games

mod aggregate;
mod types;

pub use aggregate::{calculate_statistics, RECENT_GAMES};
pub use types::*;
