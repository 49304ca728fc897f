//! Chess Stats Core Library
//!
//! Client-side logic of the chess stats dashboard: the backend REST client,
//! statistics over a player's game history, and a deduplicating read cache
//! for players.

pub mod api;
pub mod auth;
pub mod cache;
pub mod error;
pub mod load;
pub mod stats;

pub use api::{ApiClient, Game, Player, PlayerWithStats};
pub use auth::{login, Credential};
pub use cache::{EntityCache, EntitySource};
pub use error::{Error, Result};
pub use load::LoadState;
pub use stats::{calculate_statistics, GameStatistics};

/// Player cache backed by the REST API
pub type PlayerCache = EntityCache<ApiClient>;
