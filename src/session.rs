//! Session manager — single authority for authentication state
//!
//! Owns the process-wide [`Session`], mediates every state-changing auth
//! operation against the backend, mirrors the session to persistent
//! storage, and broadcasts every transition to subscribed observers
//! (navigation chrome, router, page guards).
//!
//! All reads are synchronous snapshots; the only mutation point is
//! [`SessionManager::set_session`]. Observers are notified synchronously
//! in subscription order with the same immutable snapshot, and each
//! observer call is isolated so one panicking observer cannot block the
//! rest.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, RwLock};

use crate::backend::AuthBackend;
use crate::router::paths;
use crate::state::SessionStore;
use crate::surface::Surface;
use crate::types::{Role, Session, UserDescriptor};

const MSG_SIGNED_IN: &str = "Signed in successfully";
const MSG_SIGNED_OUT: &str = "Signed out";
const MSG_ACCOUNT_CREATED: &str = "Account created";
const MSG_LOGIN_FAILED: &str = "Login failed";
const MSG_REGISTER_FAILED: &str = "Registration failed";
const MSG_NO_ACCESS: &str = "You do not have access to this page";

const BUSY_SIGNING_IN: &str = "Signing in...";
const BUSY_REGISTERING: &str = "Creating account...";
const BUSY_SIGNING_OUT: &str = "Signing out...";

/// Callback invoked with the new session snapshot on every change
pub type SessionObserver = Arc<dyn Fn(&Session) + Send + Sync>;

/// Single source of truth for "who is signed in"
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    store: Box<dyn SessionStore>,
    surface: Surface,
    session: RwLock<Session>,
    observers: Mutex<Vec<SessionObserver>>,
}

impl SessionManager {
    /// Create the manager, restoring any persisted session
    ///
    /// The restored snapshot is trusted without a backend round trip;
    /// callers that want confirmation invoke [`validate_session`]
    /// (the app bootstrap does). Unreadable storage starts empty.
    ///
    /// [`validate_session`]: SessionManager::validate_session
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Box<dyn SessionStore>,
        surface: Surface,
    ) -> Self {
        let session = match store.load() {
            Ok(Some(session)) => {
                tracing::info!(
                    username = %session.user.as_ref().map(|u| u.username.as_str()).unwrap_or(""),
                    "Restored persisted session"
                );
                session
            }
            Ok(None) => Session::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted session, starting empty");
                Session::empty()
            }
        };

        Self {
            backend,
            store,
            surface,
            session: RwLock::new(session),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer for session changes
    ///
    /// Observers fire on every subsequent [`set_session`] call, in
    /// subscription order. There is no replay of the current state at
    /// subscription time.
    ///
    /// [`set_session`]: SessionManager::set_session
    pub fn subscribe(&self, observer: impl Fn(&Session) + Send + Sync + 'static) {
        self.observers
            .lock()
            .expect("observer lock")
            .push(Arc::new(observer));
    }

    /// Replace the session — the only mutation point
    ///
    /// The whole descriptor is swapped atomically, storage is mirrored
    /// within the same synchronous step (failures are logged, never
    /// propagated), then observers run.
    pub fn set_session(&self, user: Option<UserDescriptor>) {
        let session = match user {
            Some(user) => Session::established(user),
            None => Session::empty(),
        };

        {
            let mut current = self.session.write().expect("session lock");
            *current = session.clone();
        }

        let mirrored = if session.is_authenticated() {
            self.store.save(&session)
        } else {
            self.store.clear()
        };
        if let Err(e) = mirrored {
            tracing::error!(error = %e, "Failed to mirror session to storage");
        }

        self.notify(&session);
    }

    fn notify(&self, session: &Session) {
        let observers: Vec<SessionObserver> = self
            .observers
            .lock()
            .expect("observer lock")
            .clone();

        for (index, observer) in observers.iter().enumerate() {
            // One broken observer must not block the others
            if catch_unwind(AssertUnwindSafe(|| observer(session))).is_err() {
                tracing::error!(index, "Session observer panicked");
            }
        }
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Session {
        self.session.read().expect("session lock").clone()
    }

    /// The signed-in user, if any
    pub fn user(&self) -> Option<UserDescriptor> {
        self.session.read().expect("session lock").user.clone()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.session.read().expect("session lock").is_authenticated()
    }

    /// Whether the signed-in user is an administrator
    pub fn is_admin(&self) -> bool {
        self.session
            .read()
            .expect("session lock")
            .has_role(Role::Admin)
    }

    /// Sign in with credentials
    ///
    /// Returns `true` and establishes the session on success; on any
    /// failure shows an error notice and leaves the session unchanged.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let _busy = self.surface.loading.scoped(BUSY_SIGNING_IN);

        match self.backend.login(username, password).await {
            Ok(user) => {
                self.set_session(Some(user));
                self.surface.notices.success(MSG_SIGNED_IN);
                true
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "Login failed");
                self.surface.notices.error(e.user_message(MSG_LOGIN_FAILED));
                false
            }
        }
    }

    /// Create an account and establish a session for it
    ///
    /// Registration implies sign-in; no second round trip.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> bool {
        let _busy = self.surface.loading.scoped(BUSY_REGISTERING);

        match self.backend.register(username, email, password).await {
            Ok(user) => {
                self.set_session(Some(user));
                self.surface.notices.success(MSG_ACCOUNT_CREATED);
                true
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "Registration failed");
                self.surface
                    .notices
                    .error(e.user_message(MSG_REGISTER_FAILED));
                false
            }
        }
    }

    /// Sign out
    ///
    /// The backend call is best-effort: the local session is always
    /// cleared and navigation returns to the login page, even when the
    /// server is unreachable.
    pub async fn logout(&self) {
        let _busy = self.surface.loading.scoped(BUSY_SIGNING_OUT);

        match self.backend.logout().await {
            Ok(()) => self.surface.notices.success(MSG_SIGNED_OUT),
            Err(e) => tracing::warn!(error = %e, "Backend logout failed, clearing locally"),
        }

        self.set_session(None);
        self.surface.address.push(paths::LOGIN);
    }

    /// Confirm the session with the backend, refreshing the descriptor
    ///
    /// No session: returns `false` without a network call. On success the
    /// refreshed descriptor replaces the session (role changes since
    /// sign-in land here). On failure of any kind the session and its
    /// persisted snapshot are cleared.
    pub async fn validate_session(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        match self.backend.current_user().await {
            Ok(user) => {
                self.set_session(Some(user));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session validation failed, signing out");
                self.set_session(None);
                false
            }
        }
    }

    /// Guard: require a signed-in user
    ///
    /// Redirects to the login page (overwriting the current history
    /// entry) and returns `false` when unauthenticated, so handlers can
    /// early-return.
    pub fn require_authenticated(&self) -> bool {
        if self.is_authenticated() {
            return true;
        }
        self.surface.address.replace(paths::LOGIN);
        false
    }

    /// Guard: require a signed-in user carrying `role`
    ///
    /// Unauthenticated callers are redirected to login; authenticated
    /// callers with the wrong role get an access notice and a redirect
    /// home. Returns `false` in both cases.
    pub fn require_role(&self, role: Role) -> bool {
        if !self.is_authenticated() {
            self.surface.address.replace(paths::LOGIN);
            return false;
        }
        if self.current().has_role(role) {
            return true;
        }
        self.surface.notices.error(MSG_NO_ACCESS);
        self.surface.address.replace(paths::HOME);
        false
    }
}
