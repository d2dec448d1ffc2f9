//! HTTP backend — the platform's REST API over reqwest
//!
//! Session continuity uses the server's session cookie, so the client
//! keeps a cookie store. Responses arrive in a `{ success, ... }`
//! envelope: `success: false` carries a user-facing `error` message and
//! maps to `ShellError::Rejected`; transport and protocol failures map
//! to `ShellError::Transport`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::backend::{AuthBackend, TournamentBackend};
use crate::error::{Result, ShellError};
use crate::types::{NewTournament, Tournament, TournamentMatch, UserDescriptor};

/// HTTP backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Base URL of the REST API (e.g. `https://arena.example.com/api`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// REST API endpoint paths
mod endpoints {
    use uuid::Uuid;

    pub const REGISTER: &str = "/register/";
    pub const LOGIN: &str = "/login/";
    pub const LOGOUT: &str = "/logout/";
    pub const ME: &str = "/me/";

    pub const TOURNAMENTS: &str = "/tournaments/";
    pub const MY_TOURNAMENTS: &str = "/tournaments/my/";
    pub const CREATE_TOURNAMENT: &str = "/tournaments/create/";
    pub const JOIN_TOURNAMENT: &str = "/tournaments/join/";

    pub fn tournament(id: Uuid) -> String {
        format!("/tournaments/{}/", id)
    }

    pub fn start_tournament(id: Uuid) -> String {
        format!("/tournaments/{}/start/", id)
    }

    pub fn matches(id: Uuid) -> String {
        format!("/tournaments/{}/matches/", id)
    }

    pub fn match_result(id: Uuid) -> String {
        format!("/matches/{}/result/", id)
    }
}

/// Response envelope for auth endpoints
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    success: bool,
    #[serde(default)]
    user: Option<UserDescriptor>,
    #[serde(default)]
    error: Option<String>,
}

/// Response envelope for everything else
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of the backend contract
pub struct HttpBackend {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpBackend {
    /// Build a client for the configured API
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| ShellError::Transport(format!("Failed to build client: {}", e)))?;

        tracing::info!(base_url = %config.base_url, "HTTP backend ready");

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ShellError::Transport(format!("GET {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ShellError::Transport(format!("POST {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ShellError::Transport(format!("{}: {}", path, e)))?;

        // Error statuses still carry the envelope with a message;
        // fall back to the bare status when the body isn't one.
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(ShellError::Transport(format!(
                "{}: malformed response: {}",
                path, e
            ))),
            Err(_) => Err(ShellError::Transport(format!("{}: HTTP {}", path, status))),
        }
    }

    fn unwrap_user(envelope: UserEnvelope, context: &str) -> Result<UserDescriptor> {
        if envelope.success {
            envelope.user.ok_or_else(|| {
                ShellError::Transport(format!("{}: success without a user", context))
            })
        } else {
            Err(ShellError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| format!("{} failed", context)),
            ))
        }
    }

    fn unwrap_data<T>(envelope: Envelope<T>, context: &str) -> Result<T> {
        if envelope.success {
            envelope.data.ok_or_else(|| {
                ShellError::Transport(format!("{}: success without data", context))
            })
        } else {
            Err(ShellError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| format!("{} failed", context)),
            ))
        }
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserDescriptor> {
        let envelope: UserEnvelope = self
            .post(
                endpoints::REGISTER,
                &serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await?;

        let user = Self::unwrap_user(envelope, "Registration")?;
        tracing::info!(username = %user.username, "Account registered");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserDescriptor> {
        let envelope: UserEnvelope = self
            .post(
                endpoints::LOGIN,
                &serde_json::json!({
                    "username": username,
                    "password": password,
                }),
            )
            .await?;

        let user = Self::unwrap_user(envelope, "Login")?;
        tracing::info!(username = %user.username, "Signed in");
        Ok(user)
    }

    async fn logout(&self) -> Result<()> {
        let envelope: Envelope<serde_json::Value> =
            self.post(endpoints::LOGOUT, &serde_json::json!({})).await?;

        if !envelope.success {
            return Err(ShellError::Rejected(
                envelope.error.unwrap_or_else(|| "Logout failed".to_string()),
            ));
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<UserDescriptor> {
        let envelope: UserEnvelope = self.get(endpoints::ME).await?;
        Self::unwrap_user(envelope, "Session check")
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[async_trait]
impl TournamentBackend for HttpBackend {
    async fn tournaments(&self) -> Result<Vec<Tournament>> {
        let envelope: Envelope<Vec<Tournament>> = self.get(endpoints::TOURNAMENTS).await?;
        Self::unwrap_data(envelope, "Tournament list")
    }

    async fn my_tournaments(&self) -> Result<Vec<Tournament>> {
        let envelope: Envelope<Vec<Tournament>> = self.get(endpoints::MY_TOURNAMENTS).await?;
        Self::unwrap_data(envelope, "My tournaments")
    }

    async fn tournament(&self, id: Uuid) -> Result<Tournament> {
        let envelope: Envelope<Tournament> = self.get(&endpoints::tournament(id)).await?;
        Self::unwrap_data(envelope, "Tournament details")
    }

    async fn create_tournament(&self, new: NewTournament) -> Result<Tournament> {
        let envelope: Envelope<Tournament> =
            self.post(endpoints::CREATE_TOURNAMENT, &new).await?;

        let tournament = Self::unwrap_data(envelope, "Tournament creation")?;
        tracing::info!(
            tournament_id = %tournament.id,
            join_code = %tournament.join_code,
            "Tournament created"
        );
        Ok(tournament)
    }

    async fn join_tournament(&self, code: &str) -> Result<Tournament> {
        let envelope: Envelope<Tournament> = self
            .post(endpoints::JOIN_TOURNAMENT, &serde_json::json!({ "code": code }))
            .await?;
        Self::unwrap_data(envelope, "Tournament join")
    }

    async fn start_tournament(&self, id: Uuid) -> Result<Tournament> {
        let envelope: Envelope<Tournament> = self
            .post(&endpoints::start_tournament(id), &serde_json::json!({}))
            .await?;
        Self::unwrap_data(envelope, "Tournament start")
    }

    async fn matches(&self, tournament_id: Uuid) -> Result<Vec<TournamentMatch>> {
        let envelope: Envelope<Vec<TournamentMatch>> =
            self.get(&endpoints::matches(tournament_id)).await?;
        Self::unwrap_data(envelope, "Match list")
    }

    async fn record_result(&self, match_id: Uuid, winner_id: Uuid) -> Result<()> {
        let envelope: Envelope<serde_json::Value> = self
            .post(
                &endpoints::match_result(match_id),
                &serde_json::json!({ "winner_id": winner_id }),
            )
            .await?;

        if !envelope.success {
            return Err(ShellError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "Recording the result failed".to_string()),
            ));
        }
        Ok(())
    }
}
