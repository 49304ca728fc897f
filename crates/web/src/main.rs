use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use chess_stats_core::{ApiClient, PlayerCache};

mod config;
mod error;
mod routes;
mod session;
#[cfg(test)]
mod test_backend;

use config::Config;
use session::SessionStore;

pub struct AppState {
    pub client: ApiClient,
    pub players: PlayerCache,
    pub config: Config,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(client: ApiClient, config: Config) -> Self {
        Self {
            players: PlayerCache::new(client.clone()),
            client,
            config,
            sessions: SessionStore::default(),
        }
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::players_list))
        .route("/players/:id", get(routes::player_page))
        .route("/games/:id", get(routes::game_details))
        .route("/health", get(routes::health))
        .route("/admin", get(routes::admin::admin_page))
        .route("/admin/login", post(routes::admin::login))
        .route("/admin/logout", post(routes::admin::logout))
        .route("/admin/players", post(routes::admin::create_player))
        .route("/admin/players/:id", post(routes::admin::update_player))
        .route("/admin/players/:id/delete", post(routes::admin::delete_player))
        .route("/admin/games", post(routes::admin::create_game))
        .route("/admin/games/:id", post(routes::admin::update_game))
        .route("/admin/games/:id/delete", post(routes::admin::delete_game))
        .nest_service("/static", ServeDir::new("crates/web/static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let client = match ApiClient::with_timeout(config.api_url.clone(), config.timeout) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr;
    tracing::info!(api = %config.api_url, server_aggregation = config.server_aggregation, "starting dashboard");
    let state = Arc::new(AppState::new(client, config));

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
