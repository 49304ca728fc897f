//! Stand-in backend for handler tests

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chess_stats_core::ApiClient;

use crate::config::Config;
use crate::AppState;

const ADMIN_HEADER: &str = "Basic YWRtaW46c2VjcmV0"; // admin:secret

#[derive(Default)]
pub struct Backend {
    pub player_lookups: AtomicUsize,
    pub player_deletes: AtomicUsize,
    pub game_patch: Mutex<Option<Value>>,
}

impl Backend {
    pub fn lookups(&self) -> usize {
        self.player_lookups.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.player_deletes.load(Ordering::SeqCst)
    }
}

fn player_json(id: &str) -> Option<Value> {
    match id {
        "1" => Some(json!({ "id": "1", "name": "Alex Grandmaster", "username": "Grandmaster123", "rating": 2450 })),
        "2" => Some(json!({ "id": "2", "name": "Maria ChessMaster", "username": "ChessMaster99", "rating": 2320 })),
        _ => None,
    }
}

fn game_json(id: &str, player_id: &str, opponent_id: &str) -> Value {
    json!({
        "id": id, "date": "2024-02-01", "playerId": player_id, "opponentId": opponent_id,
        "result": "win", "color": "white", "timeControl": "rapid", "moves": 35,
        "rating": { "before": 1200, "after": 1210, "change": 10 },
        "notes": "Won the exchange on move 20"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == ADMIN_HEADER)
        .unwrap_or(false)
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{} not found", what) }))).into_response()
}

async fn list_players() -> Json<Value> {
    let stats = json!({ "totalGames": 2, "wins": 1, "losses": 1, "draws": 0, "winRate": 50.0, "currentRating": 1210 });
    let players = ["1", "2"]
        .iter()
        .filter_map(|id| player_json(id))
        .map(|mut p| {
            p["stats"] = stats.clone();
            p
        })
        .collect::<Vec<_>>();
    Json(Value::Array(players))
}

async fn player_by_id(State(backend): State<Arc<Backend>>, Path(id): Path<String>) -> Response {
    backend.player_lookups.fetch_add(1, Ordering::SeqCst);
    match player_json(&id) {
        Some(player) => Json(player).into_response(),
        None => not_found("Player"),
    }
}

async fn delete_player(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    backend.player_deletes.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

/// Newest first: the latest game is against player 2, the oldest against
/// an id the backend does not know.
async fn games_for_player(Path(id): Path<String>) -> Json<Value> {
    let mut oldest = game_json("g1", &id, "3");
    oldest["result"] = json!("loss");
    oldest["rating"] = json!({ "before": 1190, "after": 1180, "change": -10 });
    Json(json!([game_json("g2", &id, "2"), oldest]))
}

/// Only player 1 has server-side statistics
async fn statistics(Path(id): Path<String>) -> Response {
    if id != "1" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({
        "totalGames": 9, "wins": 3, "losses": 3, "draws": 3, "winRate": 33.33,
        "averageRating": 1300, "ratingChange": 77,
        "gamesByTimeControl": { "bullet": 0, "blitz": 9, "rapid": 0, "classical": 0 },
        "gamesByColor": { "white": 5, "black": 4 },
        "recentGames": []
    }))
    .into_response()
}

async fn all_games() -> Json<Value> {
    Json(json!([game_json("g2", "1", "2")]))
}

async fn game_by_id(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "g2" => Json(game_json("g2", "1", "2")).into_response(),
        "g3" => Json(game_json("g3", "1", "3")).into_response(),
        _ => not_found("Game"),
    }
}

async fn update_game(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut game = game_json(&id, "1", "2");
    for (key, value) in patch.as_object().into_iter().flatten() {
        game[key] = value.clone();
    }
    *backend.game_patch.lock().unwrap() = Some(patch);
    Json(game).into_response()
}

async fn verify(Json(body): Json<Value>) -> Json<Value> {
    let ok = body["username"] == "admin" && body["password"] == "secret";
    Json(json!({ "success": ok }))
}

/// Serve the stand-in backend on port 0 and build dashboard state against it
pub async fn start(server_aggregation: bool) -> (Arc<AppState>, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let api = Router::new()
        .route("/players", get(list_players))
        .route("/players/:id", get(player_by_id).delete(delete_player))
        .route("/games", get(all_games))
        .route("/games/:id", get(game_by_id).put(update_game))
        .route("/games/player/:id", get(games_for_player))
        .route("/games/player/:id/statistics", get(statistics))
        .route("/auth/verify", post(verify))
        .with_state(Arc::clone(&backend));
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config {
        api_url: format!("http://{addr}/api"),
        server_aggregation,
        ..Config::default()
    };
    let client = ApiClient::new(config.api_url.clone()).unwrap();
    (Arc::new(AppState::new(client, config)), backend)
}

/// Cookie header a browser would send back after `response` set one
pub fn cookie_from(response: &Response) -> HeaderMap {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    let pair = set_cookie.split(';').next().unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
    headers
}
