//! # arena-shell
//!
//! Client-side navigation and session management core for the Arena
//! tournament platform.
//!
//! ## Overview
//!
//! `arena-shell` is the part of a single-page client that carries real
//! invariants: a fragment [`Router`] with per-route authentication
//! guards, and a [`SessionManager`] that owns the process-wide session,
//! persists it across reloads, and notifies every observer of each
//! transition. Page rendering, widgets, and the REST backend stay
//! outside, behind the [`surface`] and [`backend`] traits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use arena_shell::{App, MemoryBackend, MemorySessionStore, Role, Surface};
//!
//! # async fn example() -> arena_shell::Result<()> {
//! let backend = Arc::new(
//!     MemoryBackend::new().with_account("bob", "hunter2", Role::Player),
//! );
//! let mut app = App::new(
//!     backend,
//!     Box::new(MemorySessionStore::default()),
//!     Surface::in_memory(),
//! );
//!
//! app.router.register_public("/login", |_params| async { Ok(()) })?;
//! app.router.register("/home", |_params| async { Ok(()) })?;
//! app.router.register("/tournament/:id", |params| async move {
//!     let _tournament_id = &params[0];
//!     Ok(())
//! })?;
//!
//! app.start().await
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **[`SessionManager`]** — single source of truth for "who is signed
//!   in"; synchronous reads, ordered observer notification, persistence
//!   through a pluggable [`SessionStore`]
//! - **[`Router`]** — ordered route registry with exact-then-pattern
//!   resolution, guard enforcement, and default-route fallback
//! - **[`backend`]** — the REST contract (`AuthBackend`,
//!   `TournamentBackend`) with HTTP and in-memory implementations
//! - **[`surface`]** — the host-page boundary (address bar, notices,
//!   error view, loading overlay)

pub mod app;
pub mod backend;
pub mod error;
pub mod loading;
pub mod router;
pub mod session;
pub mod state;
pub mod surface;
pub mod types;
pub mod validate;

// Re-export core types
pub use app::App;
pub use backend::{AuthBackend, HttpBackend, HttpConfig, MemoryBackend, TournamentBackend};
pub use error::{Result, ShellError};
pub use loading::{LoadingGauge, LoadingGuard};
pub use router::{paths, HandlerFuture, Router};
pub use session::{SessionManager, SessionObserver};
pub use state::{FileSessionStore, MemorySessionStore, SessionStore};
pub use surface::{
    AddressBar, ErrorScreen, LoadingIndicator, MemoryAddressBar, MemoryErrorScreen,
    MemoryLoadingIndicator, MemoryNotices, NoticeKind, Notices, Surface,
};
pub use types::{
    NewTournament, Role, Session, Tournament, TournamentKind, TournamentMatch,
    TournamentStatus, UserDescriptor, JOIN_CODE_LEN,
};
