use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use futures::future::join_all;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chess_stats_core::api::{Game, GameResult};
use chess_stats_core::stats::GameStatistics;
use chess_stats_core::{calculate_statistics, LoadState, PlayerCache, PlayerWithStats};

use crate::error::WebError;
use crate::AppState;

pub mod admin;

// ============================================================================
// TEMPLATES
// ============================================================================

#[derive(Template)]
#[template(path = "players.html")]
pub struct PlayersTemplate {
    pub title: String,
    pub players: Vec<PlayerRow>,
}

#[derive(Template)]
#[template(path = "player.html")]
pub struct PlayerTemplate {
    pub title: String,
    pub id: String,
    pub name: String,
    pub username: String,
    pub current_rating: i32,
    pub total_games: usize,
    pub analytics_tab: bool,
    pub games: Vec<GameRow>,
    pub analytics: Option<AnalyticsView>,
    pub analytics_error: Option<String>,
}

#[derive(Template)]
#[template(path = "game.html")]
pub struct GameTemplate {
    pub title: String,
    pub player_id: String,
    pub player_name: String,
    pub opponent_id: String,
    pub opponent_name: String,
    pub game: GameRow,
    pub rating_before: i32,
    pub notes: Option<String>,
}

// ============================================================================
// VIEWS
// ============================================================================

pub struct PlayerRow {
    pub id: String,
    pub name: String,
    pub username: String,
    pub rating: i32,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: String,
}

impl From<&PlayerWithStats> for PlayerRow {
    fn from(entry: &PlayerWithStats) -> Self {
        Self {
            id: entry.player.id.clone(),
            name: entry.player.name.clone(),
            username: entry.player.username.clone(),
            rating: entry.stats.current_rating,
            total_games: entry.stats.total_games,
            wins: entry.stats.wins,
            losses: entry.stats.losses,
            draws: entry.stats.draws,
            win_rate: format!("{:.1}", entry.stats.win_rate),
        }
    }
}

pub struct GameRow {
    pub id: String,
    pub date: String,
    pub opponent: String,
    pub result: String,
    pub result_class: &'static str,
    pub color: &'static str,
    pub time_control: &'static str,
    pub moves: u32,
    pub rating_before: i32,
    pub rating_after: i32,
    pub rating_change: String,
    pub opening: String,
}

impl GameRow {
    pub fn new(game: &Game, names: &HashMap<String, String>) -> Self {
        let (result, result_class) = match game.result {
            GameResult::Win => ("Win", "win"),
            GameResult::Loss => ("Loss", "loss"),
            GameResult::Draw => ("Draw", "draw"),
        };

        Self {
            id: game.id.clone(),
            date: format_date(&game.date),
            opponent: names
                .get(&game.opponent_id)
                .cloned()
                .unwrap_or_else(|| game.opponent_id.clone()),
            result: result.to_string(),
            result_class,
            color: game.color.as_str(),
            time_control: game.time_control.display_name(),
            moves: game.moves,
            rating_before: game.rating.before,
            rating_after: game.rating.after,
            rating_change: signed(game.rating.change),
            opening: game.opening.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub struct TimeControlRow {
    pub name: &'static str,
    pub count: u32,
    pub percent: u32,
}

pub struct AnalyticsView {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: String,
    pub average_rating: i32,
    pub rating_change: String,
    pub time_controls: Vec<TimeControlRow>,
    pub white: u32,
    pub black: u32,
    pub recent: Vec<GameRow>,
}

impl AnalyticsView {
    pub fn new(stats: &GameStatistics<'_>, names: &HashMap<String, String>) -> Self {
        let time_controls = stats
            .games_by_time_control
            .iter()
            .map(|(tc, count)| TimeControlRow {
                name: tc.display_name(),
                count,
                percent: percent(count, stats.total_games),
            })
            .collect();

        Self {
            total_games: stats.total_games,
            wins: stats.wins,
            losses: stats.losses,
            draws: stats.draws,
            win_rate: format!("{:.1}", stats.win_rate),
            average_rating: stats.average_rating,
            rating_change: signed(stats.rating_change),
            time_controls,
            white: stats.games_by_color.white,
            black: stats.games_by_color.black,
            recent: stats
                .recent_games
                .iter()
                .map(|g| GameRow::new(g, names))
                .collect(),
        }
    }
}

/// `2024-01-05` or a full timestamp, shown as `Jan 5, 2024`
fn format_date(date: &str) -> String {
    date.get(..10)
        .and_then(|day| chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| date.to_string())
}

fn signed(value: i64) -> String {
    format!("{:+}", value)
}

fn percent(count: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Resolve display names for a set of player ids through the cache.
/// Unknown ids are left out; views fall back to the raw id.
async fn player_names<'a>(
    players: &PlayerCache,
    ids: impl IntoIterator<Item = &'a str>,
) -> HashMap<String, String> {
    let ids: Vec<&str> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let results = join_all(ids.iter().map(|id| players.get_by_id(id))).await;

    ids.into_iter()
        .zip(results)
        .filter_map(|(id, result)| match result {
            Ok(player) => Some((id.to_string(), player.name)),
            Err(e) => {
                tracing::warn!(id, "Could not resolve player: {}", e);
                None
            }
        })
        .collect()
}

// ============================================================================
// HANDLERS
// ============================================================================

#[derive(Deserialize)]
pub struct PlayerQuery {
    pub tab: Option<String>,
}

pub async fn players_list(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    let players = state.players.get_all().await?;
    tracing::debug!("Listing {} players", players.len());

    let template = PlayersTemplate {
        title: "Chess Players".to_string(),
        players: players.iter().map(PlayerRow::from).collect(),
    };
    Ok(Html(template.render()?))
}

pub async fn player_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<PlayerQuery>,
) -> Result<Html<String>, WebError> {
    let player = state.players.get_by_id(&id).await?;
    let games = state.client.fetch_games_by_player_id(&id).await?;
    let names = player_names(&state.players, games.iter().map(|g| g.opponent_id.as_str())).await;

    let analytics_tab = query.tab.as_deref() == Some("analytics");
    let statistics: LoadState<GameStatistics<'_>> = if !analytics_tab {
        LoadState::NotLoaded
    } else if state.config.server_aggregation {
        LoadState::from_result(state.client.fetch_player_statistics(&id).await)
    } else {
        LoadState::Loaded(calculate_statistics(&games))
    };

    let (analytics, analytics_error) = match statistics {
        LoadState::Loaded(stats) => (Some(AnalyticsView::new(&stats, &names)), None),
        LoadState::Failed(message) => {
            tracing::warn!(player = %id, "Statistics unavailable: {}", message);
            (None, Some(message))
        }
        LoadState::NotLoaded | LoadState::Loading => (None, None),
    };

    let current_rating = games
        .first()
        .map(|g| g.rating.after)
        .unwrap_or(player.rating);

    let template = PlayerTemplate {
        title: player.name.clone(),
        id: player.id.clone(),
        name: player.name,
        username: player.username,
        current_rating,
        total_games: games.len(),
        analytics_tab,
        games: games.iter().map(|g| GameRow::new(g, &names)).collect(),
        analytics,
        analytics_error,
    };
    Ok(Html(template.render()?))
}

pub async fn game_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let game = state.client.fetch_game_by_id(&id).await?;

    let (player, opponent) = tokio::join!(
        state.players.get_by_id(&game.player_id),
        state.players.get_by_id(&game.opponent_id)
    );
    let (player, opponent) = (player?, opponent?);

    let names = HashMap::from([(opponent.id.clone(), opponent.name.clone())]);

    let template = GameTemplate {
        title: format!("{} vs {}", player.name, opponent.name),
        player_id: player.id,
        player_name: player.name,
        opponent_id: opponent.id,
        opponent_name: opponent.name,
        game: GameRow::new(&game, &names),
        rating_before: game.rating.before,
        notes: game.notes,
    };
    Ok(Html(template.render()?))
}

pub async fn health() -> &'static str {
    "OK"
}
