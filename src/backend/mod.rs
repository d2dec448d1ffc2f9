//! Backend trait — the REST boundary the shell talks to
//!
//! All backends (the platform's HTTP API, the in-memory development
//! backend) implement `AuthBackend` and `TournamentBackend` to give the
//! session and view layers a uniform, transport-free API.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{NewTournament, Tournament, TournamentMatch, UserDescriptor};

pub mod http;
pub mod memory;

pub use http::{HttpBackend, HttpConfig};
pub use memory::MemoryBackend;

/// Authentication operations of the backend contract
///
/// Application-level rejections (bad credentials, taken username) come
/// back as [`crate::ShellError::Rejected`] carrying the server's message;
/// network and protocol failures as [`crate::ShellError::Transport`].
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account, returning the new user's descriptor
    ///
    /// A successful registration counts as a sign-in on the server, so
    /// the session layer establishes a session from the returned
    /// descriptor without a second round trip.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserDescriptor>;

    /// Exchange credentials for the signed-in user's descriptor
    async fn login(&self, username: &str, password: &str) -> Result<UserDescriptor>;

    /// End the server-side session
    ///
    /// Callers tolerate failure — local sign-out never blocks on it.
    async fn logout(&self) -> Result<()>;

    /// Fetch the current user's descriptor, confirming the session
    ///
    /// Also the refresh path: role changes since sign-in land here.
    async fn current_user(&self) -> Result<UserDescriptor>;

    /// Backend name (e.g., "http", "memory")
    fn name(&self) -> &str;
}

/// Tournament operations of the backend contract
#[async_trait]
pub trait TournamentBackend: Send + Sync {
    /// All public tournaments
    async fn tournaments(&self) -> Result<Vec<Tournament>>;

    /// Tournaments the current user participates in or created
    async fn my_tournaments(&self) -> Result<Vec<Tournament>>;

    /// A single tournament by id
    async fn tournament(&self, id: Uuid) -> Result<Tournament>;

    /// Create a tournament; the server assigns id and join code
    async fn create_tournament(&self, new: NewTournament) -> Result<Tournament>;

    /// Join a tournament by its six-digit code
    async fn join_tournament(&self, code: &str) -> Result<Tournament>;

    /// Start a pending tournament (creator/admin only)
    async fn start_tournament(&self, id: Uuid) -> Result<Tournament>;

    /// Matches of a tournament, in bracket order
    async fn matches(&self, tournament_id: Uuid) -> Result<Vec<TournamentMatch>>;

    /// Record a match result
    async fn record_result(&self, match_id: Uuid, winner_id: Uuid) -> Result<()>;
}
