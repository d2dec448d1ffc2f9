//! Application context and bootstrap
//!
//! One `App` per page: built once at startup, then handed (or cloned
//! piecewise) into view handlers. Replaces the module-level singletons a
//! hash-routed page would otherwise accumulate while keeping
//! single-instance semantics.

use std::sync::Arc;

use crate::backend::AuthBackend;
use crate::error::Result;
use crate::router::Router;
use crate::session::SessionManager;
use crate::state::SessionStore;
use crate::surface::Surface;

/// The assembled application core
///
/// Route registration happens between `new` and `start`:
///
/// ```no_run
/// # use std::sync::Arc;
/// # use arena_shell::{App, MemoryBackend, MemorySessionStore, Surface};
/// # async fn example() -> arena_shell::Result<()> {
/// let mut app = App::new(
///     Arc::new(MemoryBackend::new()),
///     Box::new(MemorySessionStore::default()),
///     Surface::in_memory(),
/// );
///
/// let session = app.session.clone();
/// app.router.register_public("/login", move |_params| {
///     let _session = session.clone();
///     async move { /* render the login form */ Ok(()) }
/// })?;
///
/// app.start().await
/// # }
/// ```
pub struct App {
    pub surface: Surface,
    pub session: Arc<SessionManager>,
    pub router: Router,
}

impl App {
    /// Assemble the core from its collaborators
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Box<dyn SessionStore>,
        surface: Surface,
    ) -> Self {
        let session = Arc::new(SessionManager::new(backend, store, surface.clone()));
        let router = Router::new(session.clone(), surface.clone());
        Self {
            surface,
            session,
            router,
        }
    }

    /// Bootstrap: confirm any restored session, then dispatch once
    ///
    /// A persisted session that the backend no longer recognizes is
    /// cleared here; the first dispatch then lands on the login route
    /// through the ordinary guard logic.
    pub async fn start(&self) -> Result<()> {
        if self.session.is_authenticated() {
            if self.session.validate_session().await {
                tracing::info!("Session confirmed with backend");
            } else {
                tracing::info!("Persisted session rejected, continuing signed out");
            }
        }

        self.router.dispatch().await
    }
}
