use askama::Template;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, Response},
    Form,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use chess_stats_core::api::{
    Color, GameFormValues, GamePatch, GameRating, GameResult, PlayerFormValues, PlayerPatch,
    TimeControl,
};
use chess_stats_core::{login as verify_login, LoadState};

use super::{GameRow, PlayerRow};
use crate::error::WebError;
use crate::session::SessionId;
use crate::AppState;

const ADMIN_GAMES_SHOWN: usize = 20;

// ============================================================================
// TEMPLATES
// ============================================================================

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub title: String,
    pub username: Option<String>,
    pub flash: Option<String>,
    pub players: Vec<PlayerRow>,
    pub games: Vec<GameRow>,
    pub games_error: Option<String>,
}

// ============================================================================
// FORMS
// ============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PlayerForm {
    pub name: String,
    pub username: String,
    pub rating: i32,
    #[serde(default)]
    pub avatar: String,
}

impl PlayerForm {
    fn avatar(&self) -> Option<String> {
        non_empty(&self.avatar)
    }

    fn into_values(self) -> PlayerFormValues {
        PlayerFormValues {
            avatar: self.avatar(),
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            rating: self.rating,
        }
    }

    fn into_patch(self) -> PlayerPatch {
        PlayerPatch {
            avatar: self.avatar(),
            name: non_empty(&self.name),
            username: non_empty(&self.username),
            rating: Some(self.rating),
        }
    }
}

#[derive(Deserialize)]
pub struct GameForm {
    pub date: String,
    pub player_id: String,
    pub opponent_id: String,
    pub result: GameResult,
    pub color: Color,
    pub time_control: TimeControl,
    pub moves: u32,
    pub rating_before: i32,
    pub rating_after: i32,
    #[serde(default)]
    pub opening: String,
    #[serde(default)]
    pub notes: String,
}

impl GameForm {
    fn into_values(self) -> GameFormValues {
        GameFormValues {
            rating: GameRating::new(self.rating_before, self.rating_after),
            opening: non_empty(&self.opening),
            notes: non_empty(&self.notes),
            date: self.date,
            player_id: self.player_id,
            opponent_id: self.opponent_id,
            result: self.result,
            color: self.color,
            time_control: self.time_control,
            moves: self.moves,
        }
    }
}

/// Corrections to a recorded game
#[derive(Deserialize)]
pub struct GameEditForm {
    pub result: GameResult,
    pub moves: u32,
    pub rating_before: i32,
    pub rating_after: i32,
}

impl GameEditForm {
    fn into_patch(self) -> GamePatch {
        GamePatch {
            result: Some(self.result),
            moves: Some(self.moves),
            rating: Some(GameRating::new(self.rating_before, self.rating_after)),
            ..GamePatch::default()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn admin_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, WebError> {
    let session = SessionId::from_headers(&headers);
    let flash = state.sessions.take_flash(&session);
    let credential = state.sessions.credential(&session);

    let (players, games, games_error) = if credential.is_some() {
        let listed = state.players.get_all().await?;
        let names: HashMap<String, String> = listed
            .iter()
            .map(|p| (p.player.id.clone(), p.player.name.clone()))
            .collect();

        let (games, games_error) = match LoadState::from_result(state.client.fetch_games(None).await) {
            LoadState::Loaded(games) => (
                games
                    .iter()
                    .take(ADMIN_GAMES_SHOWN)
                    .map(|g| GameRow::new(g, &names))
                    .collect(),
                None,
            ),
            LoadState::Failed(message) => (Vec::new(), Some(message)),
            LoadState::NotLoaded | LoadState::Loading => (Vec::new(), None),
        };

        (listed.iter().map(PlayerRow::from).collect(), games, games_error)
    } else {
        (Vec::new(), Vec::new(), None)
    };

    let template = AdminTemplate {
        title: "Admin".to_string(),
        username: credential.map(|c| c.username().to_string()),
        flash,
        players,
        games,
        games_error,
    };
    Ok(Html(template.render()?))
}

/// A successful login always starts a new session id.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let previous = SessionId::from_headers(&headers);

    match verify_login(&state.client, &form.username, &form.password).await {
        Ok(credential) => {
            state.sessions.discard(&previous);
            let session = SessionId::fresh();
            tracing::info!(user = %credential.username(), "Admin session started");
            state.sessions.sign_in(&session, credential);
            state.sessions.set_flash(&session, "Signed in");
            session.redirect("/admin")
        }
        Err(e) => {
            tracing::warn!("Admin login failed: {}", e);
            state.sessions.set_flash(&previous, e.to_string());
            previous.redirect("/admin")
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = SessionId::from_headers(&headers);
    state.sessions.sign_out(&session);
    state.sessions.set_flash(&session, "Signed out");
    session.redirect("/admin")
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<PlayerForm>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let credential = state.sessions.credential(&session);

    let flash = match state.players.create(&form.into_values(), credential.as_ref()).await {
        Ok(player) => {
            tracing::info!(id = %player.id, "Player created");
            format!("Created {}", player.name)
        }
        Err(e) => format!("Failed to create player: {}", e),
    };
    state.sessions.set_flash(&session, flash);
    session.redirect("/admin")
}

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<PlayerForm>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let credential = state.sessions.credential(&session);

    let flash = match state
        .players
        .update(&id, &form.into_patch(), credential.as_ref())
        .await
    {
        Ok(player) => {
            tracing::info!(id = %player.id, "Player updated");
            format!("Updated {}", player.name)
        }
        Err(e) => format!("Failed to update player: {}", e),
    };
    state.sessions.set_flash(&session, flash);
    session.redirect("/admin")
}

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let credential = state.sessions.credential(&session);

    let flash = match state.players.delete(&id, credential.as_ref()).await {
        Ok(()) => {
            tracing::info!(id = %id, "Player deleted");
            "Player deleted".to_string()
        }
        Err(e) => format!("Failed to delete player: {}", e),
    };
    state.sessions.set_flash(&session, flash);
    session.redirect("/admin")
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<GameForm>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let Some(credential) = state.sessions.credential(&session) else {
        state.sessions.set_flash(&session, "Sign in to add games");
        return session.redirect("/admin");
    };

    let flash = match state.client.create_game(&form.into_values(), &credential).await {
        Ok(game) => {
            tracing::info!(id = %game.id, "Game created");
            "Game added".to_string()
        }
        Err(e) => format!("Failed to add game: {}", e),
    };
    state.sessions.set_flash(&session, flash);
    session.redirect("/admin")
}

pub async fn update_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<GameEditForm>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let Some(credential) = state.sessions.credential(&session) else {
        state.sessions.set_flash(&session, "Sign in to edit games");
        return session.redirect("/admin");
    };

    let flash = match state.client.update_game(&id, &form.into_patch(), &credential).await {
        Ok(game) => {
            tracing::info!(id = %game.id, "Game updated");
            "Game updated".to_string()
        }
        Err(e) => format!("Failed to update game: {}", e),
    };
    state.sessions.set_flash(&session, flash);
    session.redirect("/admin")
}

pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let Some(credential) = state.sessions.credential(&session) else {
        state.sessions.set_flash(&session, "Sign in to delete games");
        return session.redirect("/admin");
    };

    let flash = match state.client.delete_game(&id, &credential).await {
        Ok(()) => {
            tracing::info!(id = %id, "Game deleted");
            "Game deleted".to_string()
        }
        Err(e) => format!("Failed to delete game: {}", e),
    };
    state.sessions.set_flash(&session, flash);
    session.redirect("/admin")
}
