//! Statistics types for a player's game history

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::api::{Color, Game, TimeControl};

/// Game counts per time control. Every bucket is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControlCounts {
    pub bullet: u32,
    pub blitz: u32,
    pub rapid: u32,
    pub classical: u32,
}

impl TimeControlCounts {
    pub fn get(&self, time_control: TimeControl) -> u32 {
        match time_control {
            TimeControl::Bullet => self.bullet,
            TimeControl::Blitz => self.blitz,
            TimeControl::Rapid => self.rapid,
            TimeControl::Classical => self.classical,
        }
    }

    pub fn increment(&mut self, time_control: TimeControl) {
        match time_control {
            TimeControl::Bullet => self.bullet += 1,
            TimeControl::Blitz => self.blitz += 1,
            TimeControl::Rapid => self.rapid += 1,
            TimeControl::Classical => self.classical += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.bullet + self.blitz + self.rapid + self.classical
    }

    /// (time control, count) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (TimeControl, u32)> + '_ {
        TimeControl::ALL.into_iter().map(move |tc| (tc, self.get(tc)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCounts {
    pub white: u32,
    pub black: u32,
}

impl ColorCounts {
    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn increment(&mut self, color: Color) {
        match color {
            Color::White => self.white += 1,
            Color::Black => self.black += 1,
        }
    }
}

/// Summary of a player's games.
///
/// `recent_games` borrows from the input when computed locally and is owned
/// when deserialized from the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatistics<'a> {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Percentage in `0.0..=100.0`, unrounded
    pub win_rate: f64,
    pub average_rating: i32,
    pub rating_change: i64,
    pub games_by_time_control: TimeControlCounts,
    pub games_by_color: ColorCounts,
    pub recent_games: Cow<'a, [Game]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_control_counts_iter_in_order() {
        let mut counts = TimeControlCounts::default();
        counts.increment(TimeControl::Rapid);
        counts.increment(TimeControl::Rapid);
        counts.increment(TimeControl::Bullet);

        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (TimeControl::Bullet, 1),
                (TimeControl::Blitz, 0),
                (TimeControl::Rapid, 2),
                (TimeControl::Classical, 0),
            ]
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_server_statistics_deserialize() {
        let json = r#"{
            "totalGames": 0,
            "wins": 0,
            "losses": 0,
            "draws": 0,
            "winRate": 0,
            "averageRating": 0,
            "ratingChange": 0,
            "gamesByTimeControl": { "bullet": 0, "blitz": 0, "rapid": 0, "classical": 0 },
            "gamesByColor": { "white": 0, "black": 0 },
            "recentGames": []
        }"#;

        let stats: GameStatistics<'static> = serde_json::from_str(json).unwrap();
        assert_eq!(stats, GameStatistics::default());
    }
}
