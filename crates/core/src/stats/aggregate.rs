//! Aggregation of a game history into summary statistics

use std::borrow::Cow;

use super::types::*;
use crate::api::{Game, GameResult};

/// Number of games kept in `GameStatistics::recent_games`
pub const RECENT_GAMES: usize = 5;

/// Summarize a player's games.
///
/// `games` must be ordered newest first: `rating_change` is measured from the
/// rating before the last (oldest) game to the rating after the first
/// (latest) one, and `recent_games` is the leading slice. The order is
/// trusted, not checked.
///
/// `average_rating` is the mean of `rating.after` rounded half up.
/// Rating deltas are widened to `i64`, so any pair of ratings is accepted.
pub fn calculate_statistics(games: &[Game]) -> GameStatistics<'_> {
    let (Some(latest), Some(oldest)) = (games.first(), games.last()) else {
        return GameStatistics::default();
    };

    let mut stats = GameStatistics {
        total_games: games.len() as u32,
        rating_change: i64::from(latest.rating.after) - i64::from(oldest.rating.before),
        recent_games: Cow::Borrowed(&games[..games.len().min(RECENT_GAMES)]),
        ..GameStatistics::default()
    };

    let mut rating_sum: i64 = 0;
    for game in games {
        match game.result {
            GameResult::Win => stats.wins += 1,
            GameResult::Loss => stats.losses += 1,
            GameResult::Draw => stats.draws += 1,
        }
        stats.games_by_time_control.increment(game.time_control);
        stats.games_by_color.increment(game.color);
        rating_sum += i64::from(game.rating.after);
    }

    let total = games.len() as f64;
    stats.win_rate = stats.wins as f64 / total * 100.0;
    stats.average_rating = (rating_sum as f64 / total + 0.5).floor() as i32;

    stats
}
