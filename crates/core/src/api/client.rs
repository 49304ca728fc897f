//! HTTP client for the chess stats backend

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::*;
use crate::auth::Credential;
use crate::cache::{Entity, EntitySource};
use crate::error::{Error, Result};
use crate::stats::GameStatistics;

pub const DEFAULT_API_BASE: &str = "http://localhost:3001/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    success: bool,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn headers(&self, credential: Option<&Credential>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(credential) = credential {
            match HeaderValue::from_str(credential.header_value()) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => tracing::warn!("Dropping malformed authorization header: {}", e),
            }
        }

        headers
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client.get(self.url(endpoint)).headers(self.headers(None))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(request.send().await?).await?;
        let text = response.text().await?;
        let value = serde_json::from_str(&text)?;
        Ok(value)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    pub async fn fetch_players(&self) -> Result<Vec<PlayerWithStats>> {
        self.send_json(self.get("/players")).await
    }

    pub async fn fetch_player_by_id(&self, id: &str) -> Result<Player> {
        self.send_json(self.get(&format!("/players/{}", id))).await
    }

    pub async fn create_player(
        &self,
        values: &PlayerFormValues,
        credential: &Credential,
    ) -> Result<Player> {
        let request = self
            .client
            .post(self.url("/players"))
            .headers(self.headers(Some(credential)))
            .json(values);
        self.send_json(request).await
    }

    pub async fn update_player(
        &self,
        id: &str,
        patch: &PlayerPatch,
        credential: &Credential,
    ) -> Result<Player> {
        let request = self
            .client
            .put(self.url(&format!("/players/{}", id)))
            .headers(self.headers(Some(credential)))
            .json(patch);
        self.send_json(request).await
    }

    pub async fn delete_player(&self, id: &str, credential: &Credential) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/players/{}", id)))
            .headers(self.headers(Some(credential)));
        self.send_empty(request).await
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    /// All games, optionally filtered by player
    pub async fn fetch_games(&self, player_id: Option<&str>) -> Result<Vec<Game>> {
        let mut request = self.get("/games");
        if let Some(player_id) = player_id {
            request = request.query(&[("playerId", player_id)]);
        }
        self.send_json(request).await
    }

    pub async fn fetch_game_by_id(&self, id: &str) -> Result<Game> {
        self.send_json(self.get(&format!("/games/{}", id))).await
    }

    /// Games of one player, newest first
    pub async fn fetch_games_by_player_id(&self, player_id: &str) -> Result<Vec<Game>> {
        self.send_json(self.get(&format!("/games/player/{}", player_id)))
            .await
    }

    /// Statistics aggregated by the backend instead of locally
    pub async fn fetch_player_statistics(
        &self,
        player_id: &str,
    ) -> Result<GameStatistics<'static>> {
        self.send_json(self.get(&format!("/games/player/{}/statistics", player_id)))
            .await
    }

    pub async fn create_game(&self, values: &GameFormValues, credential: &Credential) -> Result<Game> {
        let request = self
            .client
            .post(self.url("/games"))
            .headers(self.headers(Some(credential)))
            .json(values);
        self.send_json(request).await
    }

    pub async fn update_game(
        &self,
        id: &str,
        patch: &GamePatch,
        credential: &Credential,
    ) -> Result<Game> {
        let request = self
            .client
            .put(self.url(&format!("/games/{}", id)))
            .headers(self.headers(Some(credential)))
            .json(patch);
        self.send_json(request).await
    }

    pub async fn delete_game(&self, id: &str, credential: &Credential) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/games/{}", id)))
            .headers(self.headers(Some(credential)));
        self.send_empty(request).await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<bool> {
        let request = self
            .client
            .post(self.url("/auth/verify"))
            .headers(self.headers(None))
            .json(&VerifyRequest { username, password });

        let response: VerifyResponse = self.send_json(request).await?;
        Ok(response.success)
    }
}

/// Map a non-success response onto the error taxonomy, preferring the
/// message the backend put in its JSON body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| error_message(&body))
        .unwrap_or(fallback);

    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound(message)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized(message)),
        _ => Err(Error::Api(format!("{} - {}", status.as_u16(), message))),
    }
}

fn error_message(body: &serde_json::Value) -> Option<String> {
    body.get("error")
        .and_then(serde_json::Value::as_str)
        .or_else(|| body.get("message").and_then(serde_json::Value::as_str))
        .map(String::from)
}

impl Entity for Player {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Players are the entity the dashboard caches.
#[async_trait]
impl EntitySource for ApiClient {
    type Entity = Player;
    type Listed = PlayerWithStats;
    type Draft = PlayerFormValues;
    type Patch = PlayerPatch;

    async fn fetch_all(&self) -> Result<Vec<PlayerWithStats>> {
        self.fetch_players().await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Player> {
        self.fetch_player_by_id(id).await
    }

    async fn create(&self, draft: &PlayerFormValues, credential: &Credential) -> Result<Player> {
        self.create_player(draft, credential).await
    }

    async fn update(
        &self,
        id: &str,
        patch: &PlayerPatch,
        credential: &Credential,
    ) -> Result<Player> {
        self.update_player(id, patch, credential).await
    }

    async fn delete(&self, id: &str, credential: &Credential) -> Result<()> {
        self.delete_player(id, credential).await
    }
}
