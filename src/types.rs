//! Core types for the arena-shell session and tournament layers
//!
//! Wire types use the backend's snake_case field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a tournament join code (digits)
pub const JOIN_CODE_LEN: usize = 6;

/// Role tag carried by every user descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Player,
}

impl Role {
    /// Display label for chrome (navbar badge, profile header)
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Player => "Player",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Player => write!(f, "player"),
        }
    }
}

/// The authenticated user as reported by the backend
///
/// Descriptors are immutable snapshots: the session layer replaces the
/// whole value on every transition and never mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDescriptor {
    /// Backend-assigned user id
    pub id: Uuid,

    /// Login and display name
    pub username: String,

    /// Registration email, when the backend includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role tag used for guard decisions
    pub role: Role,
}

/// Process-wide record of the currently authenticated user
///
/// `user` and `established_at` are always both `Some` or both `None`;
/// the constructors below are the only ways to build one. A `None` user
/// means "unauthenticated" — no other sentinel is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The signed-in user, or `None` when unauthenticated
    pub user: Option<UserDescriptor>,

    /// When this session was established locally
    pub established_at: Option<DateTime<Utc>>,
}

impl Session {
    /// The empty (unauthenticated) session
    pub fn empty() -> Self {
        Self::default()
    }

    /// A session established now for `user`
    pub fn established(user: UserDescriptor) -> Self {
        Self {
            user: Some(user),
            established_at: Some(Utc::now()),
        }
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the signed-in user carries `role`
    pub fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == role)
    }
}

/// Tournament bracket format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentKind {
    Elimination,
    RoundRobin,
}

/// Tournament lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Pending,
    Active,
    Completed,
}

/// A tournament as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,

    pub name: String,

    pub kind: TournamentKind,

    pub status: TournamentStatus,

    /// Six-digit code participants use to join
    pub join_code: String,

    /// User id of the tournament creator
    pub created_by: Uuid,

    /// Current participant user ids, in join order
    #[serde(default)]
    pub participants: Vec<Uuid>,

    /// Participant cap set at creation
    pub max_players: u32,
}

/// Payload for creating a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,

    pub kind: TournamentKind,

    pub max_players: u32,
}

/// A single match within a tournament bracket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub id: Uuid,

    pub tournament_id: Uuid,

    pub round: u32,

    pub white: Uuid,

    pub black: Uuid,

    /// Winner, once the result has been recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Uuid>,
}
