//! In-memory backend for development and testing
//!
//! A self-contained implementation of the backend contract: seeded
//! accounts, a server-side session, and a tournament registry with
//! deterministic join codes. Failure injection covers both
//! application-level rejections and transport outages.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::{AuthBackend, TournamentBackend};
use crate::error::{Result, ShellError};
use crate::types::{
    NewTournament, Role, Tournament, TournamentMatch, TournamentStatus, UserDescriptor,
};

struct Account {
    user: UserDescriptor,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    signed_in: Option<UserDescriptor>,
    tournaments: Vec<Tournament>,
    matches: Vec<TournamentMatch>,
    codes_issued: u32,
    offline: bool,
}

/// In-memory implementation of the backend contract
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account, builder-style
    pub fn with_account(mut self, username: &str, password: &str, role: Role) -> Self {
        let state = self.state.get_mut();
        state.accounts.insert(
            username.to_string(),
            Account {
                user: UserDescriptor {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    email: Some(format!("{}@example.com", username)),
                    role,
                },
                password: password.to_string(),
            },
        );
        self
    }

    /// Change an account's role, as a platform admin would server-side
    ///
    /// The next `current_user` call reports the new role.
    pub async fn set_role(&self, username: &str, role: Role) {
        let mut state = self.state.write().await;
        if let Some(account) = state.accounts.get_mut(username) {
            account.user.role = role;
        }
        if let Some(user) = state.signed_in.as_mut() {
            if user.username == username {
                user.role = role;
            }
        }
    }

    /// Drop the server-side session, simulating expiry
    pub async fn revoke_session(&self) {
        self.state.write().await.signed_in = None;
    }

    /// Toggle a simulated network outage
    ///
    /// While offline every call returns `ShellError::Transport`.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    async fn check_online(&self) -> Result<()> {
        if self.state.read().await.offline {
            return Err(ShellError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn require_signed_in(state: &MemoryState) -> Result<UserDescriptor> {
        state
            .signed_in
            .clone()
            .ok_or_else(|| ShellError::Rejected("Not signed in".to_string()))
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserDescriptor> {
        self.check_online().await?;
        let mut state = self.state.write().await;

        if state.accounts.contains_key(username) {
            return Err(ShellError::Rejected(
                "Username is already taken".to_string(),
            ));
        }

        let user = UserDescriptor {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: Some(email.to_string()),
            role: Role::Player,
        };

        state.accounts.insert(
            username.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        state.signed_in = Some(user.clone());

        tracing::info!(%username, "Account registered");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserDescriptor> {
        self.check_online().await?;
        let mut state = self.state.write().await;

        let user = match state.accounts.get(username) {
            Some(account) if account.password == password => account.user.clone(),
            _ => {
                return Err(ShellError::Rejected(
                    "Invalid username or password".to_string(),
                ))
            }
        };

        state.signed_in = Some(user.clone());
        tracing::info!(%username, "Signed in");
        Ok(user)
    }

    async fn logout(&self) -> Result<()> {
        self.check_online().await?;
        self.state.write().await.signed_in = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<UserDescriptor> {
        self.check_online().await?;
        let state = self.state.read().await;
        state
            .signed_in
            .clone()
            .ok_or_else(|| ShellError::Rejected("Session expired".to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl TournamentBackend for MemoryBackend {
    async fn tournaments(&self) -> Result<Vec<Tournament>> {
        self.check_online().await?;
        Ok(self.state.read().await.tournaments.clone())
    }

    async fn my_tournaments(&self) -> Result<Vec<Tournament>> {
        self.check_online().await?;
        let state = self.state.read().await;
        let me = Self::require_signed_in(&state)?;
        Ok(state
            .tournaments
            .iter()
            .filter(|t| t.created_by == me.id || t.participants.contains(&me.id))
            .cloned()
            .collect())
    }

    async fn tournament(&self, id: Uuid) -> Result<Tournament> {
        self.check_online().await?;
        self.state
            .read()
            .await
            .tournaments
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ShellError::Rejected("Tournament not found".to_string()))
    }

    async fn create_tournament(&self, new: NewTournament) -> Result<Tournament> {
        self.check_online().await?;
        let mut state = self.state.write().await;
        let me = Self::require_signed_in(&state)?;

        state.codes_issued += 1;
        let tournament = Tournament {
            id: Uuid::new_v4(),
            name: new.name,
            kind: new.kind,
            status: TournamentStatus::Pending,
            // Deterministic six-digit codes keep tests reproducible
            join_code: format!("{:06}", 100_000 + state.codes_issued),
            created_by: me.id,
            participants: vec![me.id],
            max_players: new.max_players,
        };

        state.tournaments.push(tournament.clone());
        tracing::info!(tournament_id = %tournament.id, join_code = %tournament.join_code, "Tournament created");
        Ok(tournament)
    }

    async fn join_tournament(&self, code: &str) -> Result<Tournament> {
        self.check_online().await?;
        let mut state = self.state.write().await;
        let me = Self::require_signed_in(&state)?;

        let tournament = state
            .tournaments
            .iter_mut()
            .find(|t| t.join_code == code)
            .ok_or_else(|| ShellError::Rejected("No tournament with that code".to_string()))?;

        if tournament.participants.contains(&me.id) {
            return Err(ShellError::Rejected(
                "You already joined this tournament".to_string(),
            ));
        }
        if tournament.participants.len() as u32 >= tournament.max_players {
            return Err(ShellError::Rejected("Tournament is full".to_string()));
        }

        tournament.participants.push(me.id);
        Ok(tournament.clone())
    }

    async fn start_tournament(&self, id: Uuid) -> Result<Tournament> {
        self.check_online().await?;
        let mut state = self.state.write().await;
        let me = Self::require_signed_in(&state)?;

        let index = state
            .tournaments
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ShellError::Rejected("Tournament not found".to_string()))?;

        {
            let tournament = &state.tournaments[index];
            if tournament.created_by != me.id && me.role != Role::Admin {
                return Err(ShellError::Rejected(
                    "Only the creator can start a tournament".to_string(),
                ));
            }
            if tournament.status != TournamentStatus::Pending {
                return Err(ShellError::Rejected(
                    "Tournament has already started".to_string(),
                ));
            }
            if tournament.participants.len() < 2 {
                return Err(ShellError::Rejected("Not enough players".to_string()));
            }
        }

        // First-round pairings in join order
        let pairings: Vec<TournamentMatch> = {
            let tournament = &state.tournaments[index];
            tournament
                .participants
                .chunks(2)
                .filter(|pair| pair.len() == 2)
                .map(|pair| TournamentMatch {
                    id: Uuid::new_v4(),
                    tournament_id: tournament.id,
                    round: 1,
                    white: pair[0],
                    black: pair[1],
                    winner: None,
                })
                .collect()
        };

        state.matches.extend(pairings);
        state.tournaments[index].status = TournamentStatus::Active;
        Ok(state.tournaments[index].clone())
    }

    async fn matches(&self, tournament_id: Uuid) -> Result<Vec<TournamentMatch>> {
        self.check_online().await?;
        Ok(self
            .state
            .read()
            .await
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn record_result(&self, match_id: Uuid, winner_id: Uuid) -> Result<()> {
        self.check_online().await?;
        let mut state = self.state.write().await;

        let record = state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| ShellError::Rejected("Match not found".to_string()))?;

        if record.white != winner_id && record.black != winner_id {
            return Err(ShellError::Rejected(
                "Winner did not play this match".to_string(),
            ));
        }

        record.winner = Some(winner_id);
        Ok(())
    }
}
