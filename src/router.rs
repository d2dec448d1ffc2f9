//! Client-side router — fragment navigation without page loads
//!
//! Maps the current navigation target to exactly one registered handler,
//! enforcing the authentication guard, with a default-route fallback and
//! generic error rendering. Resolution is two-phase: exact lookup on the
//! literal path, then a first-match scan of placeholder patterns in
//! registration order. First match wins — never most-specific.
//!
//! The registry is populated once at startup and read-only afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Result, ShellError};
use crate::session::SessionManager;
use crate::surface::Surface;

/// Application route paths
pub mod paths {
    pub const ROOT: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const HOME: &str = "/home";
    pub const PROFILE: &str = "/profile";
    pub const CREATE_TOURNAMENT: &str = "/tournament/create";
    pub const JOIN_TOURNAMENT: &str = "/tournament/join";
    pub const TOURNAMENT_DETAILS: &str = "/tournament/:id";
}

const MSG_PAGE_FAILED: &str = "Something went wrong while loading this page";

/// Redirect budget per dispatch; exceeding it means the registry is
/// misconfigured (e.g. a guarded login route)
const MAX_REDIRECTS: u32 = 8;

/// Future returned by a route handler
pub type HandlerFuture = BoxFuture<'static, Result<()>>;

type BoxedHandler = Arc<dyn Fn(Vec<String>) -> HandlerFuture + Send + Sync>;

struct RouteEntry {
    pattern: String,
    /// Compiled placeholder matcher; `None` for purely literal patterns
    matcher: Option<Regex>,
    handler: BoxedHandler,
    requires_auth: bool,
}

/// A resolved dispatch target
struct Resolution {
    pattern: String,
    requires_auth: bool,
    handler: BoxedHandler,
    params: Vec<String>,
}

/// Fragment router with per-route authentication guards
pub struct Router {
    routes: IndexMap<String, RouteEntry>,
    session: Arc<SessionManager>,
    surface: Surface,
    current: RwLock<Option<String>>,
    generation: AtomicU64,
}

impl Router {
    pub fn new(session: Arc<SessionManager>, surface: Surface) -> Self {
        Self {
            routes: IndexMap::new(),
            session,
            surface,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Register a protected route (requires a signed-in user)
    ///
    /// `pattern` is `/`-separated; a segment starting with `:` matches
    /// any single segment and its value is passed to the handler, in
    /// declaration order. Registering the same pattern again replaces
    /// the earlier handler in place — last write wins, and the original
    /// registration slot keeps its position in the pattern scan.
    pub fn register<H, Fut>(&mut self, pattern: &str, handler: H) -> Result<()>
    where
        H: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        self.register_entry(pattern, handler, true)
    }

    /// Register a public route (no guard)
    pub fn register_public<H, Fut>(&mut self, pattern: &str, handler: H) -> Result<()>
    where
        H: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        self.register_entry(pattern, handler, false)
    }

    fn register_entry<H, Fut>(&mut self, pattern: &str, handler: H, requires_auth: bool) -> Result<()>
    where
        H: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        if pattern.is_empty() || !pattern.starts_with('/') {
            return Err(ShellError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "must be non-empty and start with '/'".to_string(),
            });
        }

        let matcher = compile_matcher(pattern)?;

        let entry = RouteEntry {
            pattern: pattern.to_string(),
            matcher,
            handler: Arc::new(move |params| Box::pin(handler(params)) as HandlerFuture),
            requires_auth,
        };

        if self.routes.insert(pattern.to_string(), entry).is_some() {
            tracing::debug!(%pattern, "Route re-registered, earlier handler shadowed");
        }
        Ok(())
    }

    /// Current dispatch generation
    ///
    /// Bumped at the start of every dispatch. A handler that reads the
    /// generation before its first await can check [`is_current`] after
    /// resuming and discard side effects that belong to a navigation the
    /// user has already left. Handlers are never cancelled.
    ///
    /// [`is_current`]: Router::is_current
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `generation` is still the latest dispatch
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Path of the most recently dispatched route
    pub fn current_route(&self) -> Option<String> {
        self.current.read().expect("route lock").clone()
    }

    /// Navigate to `path` programmatically
    ///
    /// Adds a history entry and runs one dispatch — the same resolution,
    /// guard, and fallback logic as organic navigation.
    pub async fn navigate(&self, path: &str) -> Result<()> {
        self.surface.address.push(path);
        self.dispatch().await
    }

    /// Step back in history
    ///
    /// Guard logic is not re-run here; the host's navigation-change
    /// event triggers the next [`dispatch`].
    ///
    /// [`dispatch`]: Router::dispatch
    pub fn back(&self) {
        self.surface.address.back();
    }

    /// Resolve the current navigation target and run its handler
    ///
    /// Handler failures render the generic error view and are contained
    /// here — fatal to the navigation, not to the process. `Err` is
    /// returned only when the registry has no route for the target and
    /// no applicable fallback.
    pub async fn dispatch(&self) -> Result<()> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut redirects = 0u32;

        loop {
            let raw = self.surface.address.read();
            let path = normalize(&raw);

            let Some(resolution) = self.resolve(&path) else {
                tracing::error!(%path, "No route and no fallback registered");
                self.surface.error_screen.show(MSG_PAGE_FAILED);
                return Err(ShellError::NoRoute(path));
            };

            if resolution.requires_auth && !self.session.is_authenticated() {
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    tracing::error!(%path, "Redirect loop while enforcing guards");
                    self.surface.error_screen.show(MSG_PAGE_FAILED);
                    return Err(ShellError::NoRoute(path));
                }
                tracing::info!(%path, "Guard denied, redirecting to login");
                // Overwrite the address: the user did not ask for this hop
                self.surface.address.replace(paths::LOGIN);
                continue;
            }

            {
                let mut current = self.current.write().expect("route lock");
                *current = Some(path.clone());
            }

            tracing::debug!(%path, pattern = %resolution.pattern, "Dispatching route");

            if let Err(e) = (resolution.handler)(resolution.params).await {
                tracing::error!(%path, error = %e, "Route handler failed");
                self.surface.error_screen.show(MSG_PAGE_FAILED);
            }
            return Ok(());
        }
    }

    fn resolve(&self, path: &str) -> Option<Resolution> {
        // Phase 1: exact match on the literal path
        if let Some(entry) = self.routes.get(path) {
            return Some(Resolution {
                pattern: entry.pattern.clone(),
                requires_auth: entry.requires_auth,
                handler: entry.handler.clone(),
                params: Vec::new(),
            });
        }

        // Phase 2: first placeholder pattern to match, in registration order
        for entry in self.routes.values() {
            if let Some(captures) = entry.matcher.as_ref().and_then(|re| re.captures(path)) {
                let params = captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|c| c.as_str().to_string())
                    .collect();
                return Some(Resolution {
                    pattern: entry.pattern.clone(),
                    requires_auth: entry.requires_auth,
                    handler: entry.handler.clone(),
                    params,
                });
            }
        }

        // Phase 3: default fallback by session state
        let fallback = if self.session.is_authenticated() {
            paths::HOME
        } else {
            paths::LOGIN
        };
        tracing::debug!(%path, %fallback, "No route matched, using fallback");

        self.routes.get(fallback).map(|entry| Resolution {
            pattern: entry.pattern.clone(),
            requires_auth: entry.requires_auth,
            handler: entry.handler.clone(),
            params: Vec::new(),
        })
    }
}

/// Normalize a raw fragment into a path for lookup
///
/// Splits on `/`, discards empty segments, and prefixes the rest back
/// with `/`. Empty input becomes the root path.
fn normalize(raw: &str) -> String {
    let raw = raw.trim().trim_start_matches('#');
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        paths::ROOT.to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Compile a placeholder pattern into an anchored segment matcher
///
/// Literal segments are escaped; `:name` segments become single-segment
/// captures. Patterns without placeholders need no matcher.
fn compile_matcher(pattern: &str) -> Result<Option<Regex>> {
    if !pattern.contains(':') {
        return Ok(None);
    }

    let mut source = String::from("^");
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        source.push('/');
        if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(ShellError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "placeholder segment needs a name".to_string(),
                });
            }
            source.push_str("([^/]+)");
        } else {
            source.push_str(&regex::escape(segment));
        }
    }
    source.push('$');

    Regex::new(&source)
        .map(Some)
        .map_err(|e| ShellError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::loading::LoadingGauge;
    use crate::state::MemorySessionStore;
    use crate::surface::{
        AddressBar, MemoryAddressBar, MemoryErrorScreen, MemoryLoadingIndicator, MemoryNotices,
    };
    use crate::types::{Role, UserDescriptor};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct Harness {
        router: Router,
        session: Arc<SessionManager>,
        address: Arc<MemoryAddressBar>,
        error_screen: Arc<MemoryErrorScreen>,
        log: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    }

    impl Harness {
        fn new() -> Self {
            let address = Arc::new(MemoryAddressBar::default());
            let error_screen = Arc::new(MemoryErrorScreen::default());
            let surface = Surface {
                address: address.clone(),
                notices: Arc::new(MemoryNotices::default()),
                error_screen: error_screen.clone(),
                loading: Arc::new(LoadingGauge::new(Arc::new(
                    MemoryLoadingIndicator::default(),
                ))),
            };
            let session = Arc::new(SessionManager::new(
                Arc::new(MemoryBackend::new()),
                Box::new(MemorySessionStore::default()),
                surface.clone(),
            ));
            Self {
                router: Router::new(session.clone(), surface),
                session,
                address,
                error_screen,
                log: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Register a route whose invocations land in `self.log`
        fn track(&mut self, pattern: &str, tag: &str, public: bool) {
            let log = self.log.clone();
            let tag = tag.to_string();
            let handler = move |params: Vec<String>| {
                let log = log.clone();
                let tag = tag.clone();
                async move {
                    log.lock().unwrap().push((tag, params));
                    Ok(())
                }
            };
            if public {
                self.router.register_public(pattern, handler).unwrap();
            } else {
                self.router.register(pattern, handler).unwrap();
            }
        }

        fn sign_in(&self) {
            self.session.set_session(Some(UserDescriptor {
                id: Uuid::new_v4(),
                username: "bob".to_string(),
                email: None,
                role: Role::Player,
            }));
        }

        fn invocations(&self) -> Vec<(String, Vec<String>)> {
            self.log.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("#/login"), "/login");
        assert_eq!(normalize("/tournament/42/"), "/tournament/42");
        assert_eq!(normalize("//double//slashes"), "/double/slashes");
    }

    #[test]
    fn test_register_rejects_bad_patterns() {
        let mut h = Harness::new();

        let err = h.router.register("", |_| async { Ok(()) }).unwrap_err();
        assert!(matches!(err, ShellError::InvalidPattern { .. }));

        let err = h
            .router
            .register("login", |_| async { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidPattern { .. }));

        let err = h
            .router
            .register("/tournament/:", |_| async { Ok(()) })
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_exact_match() {
        let mut h = Harness::new();
        h.track(paths::LOGIN, "login", true);
        h.track(paths::HOME, "home", false);
        h.sign_in();

        h.address.push(paths::HOME);
        h.router.dispatch().await.unwrap();

        assert_eq!(h.invocations(), vec![("home".to_string(), vec![])]);
        assert_eq!(h.router.current_route().unwrap(), paths::HOME);
    }

    #[tokio::test]
    async fn test_dispatch_pattern_captures_params() {
        let mut h = Harness::new();
        h.track(paths::TOURNAMENT_DETAILS, "details", false);
        h.sign_in();

        h.address.push("/tournament/42");
        h.router.dispatch().await.unwrap();

        assert_eq!(
            h.invocations(),
            vec![("details".to_string(), vec!["42".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_dispatch_multi_param_pattern() {
        let mut h = Harness::new();
        h.track("/tournament/:id/match/:match_id", "match", false);
        h.sign_in();

        h.address.push("/tournament/7/match/3");
        h.router.dispatch().await.unwrap();

        assert_eq!(
            h.invocations(),
            vec![(
                "match".to_string(),
                vec!["7".to_string(), "3".to_string()]
            )]
        );
    }

    #[tokio::test]
    async fn test_exact_match_preferred_over_pattern() {
        // Register "/a" then "/a/:id": "/a/5" takes the pattern with
        // one param, "/a" takes the exact route with none.
        let mut h = Harness::new();
        h.track("/a", "exact", true);
        h.track("/a/:id", "pattern", true);

        h.address.push("/a/5");
        h.router.dispatch().await.unwrap();
        h.address.push("/a");
        h.router.dispatch().await.unwrap();

        assert_eq!(
            h.invocations(),
            vec![
                ("pattern".to_string(), vec!["5".to_string()]),
                ("exact".to_string(), vec![]),
            ]
        );
    }

    #[tokio::test]
    async fn test_first_registered_pattern_wins() {
        let mut h = Harness::new();
        h.track("/t/:id", "first", true);
        h.track("/t/:code", "second", true);

        h.address.push("/t/9");
        h.router.dispatch().await.unwrap();

        assert_eq!(
            h.invocations(),
            vec![("first".to_string(), vec!["9".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_last_wins_in_place() {
        let mut h = Harness::new();
        h.track("/:first", "original", true);
        h.track("/:second", "later", true);
        // Re-registering keeps the original scan position
        h.track("/:first", "replacement", true);

        h.address.push("/anything");
        h.router.dispatch().await.unwrap();

        assert_eq!(
            h.invocations(),
            vec![("replacement".to_string(), vec!["anything".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_fallback_to_home_when_authenticated() {
        let mut h = Harness::new();
        h.track(paths::HOME, "home", false);
        h.track(paths::LOGIN, "login", true);
        h.sign_in();

        h.address.push("/no/such/route");
        h.router.dispatch().await.unwrap();

        assert_eq!(h.invocations(), vec![("home".to_string(), vec![])]);
    }

    #[tokio::test]
    async fn test_fallback_to_login_when_unauthenticated() {
        let mut h = Harness::new();
        h.track(paths::HOME, "home", false);
        h.track(paths::LOGIN, "login", true);

        h.address.push("/no/such/route");
        h.router.dispatch().await.unwrap();

        assert_eq!(h.invocations(), vec![("login".to_string(), vec![])]);
    }

    #[tokio::test]
    async fn test_guard_redirects_without_history_entry() {
        let mut h = Harness::new();
        h.track(paths::LOGIN, "login", true);
        h.track("/secret", "secret", false);

        h.address.push("/secret");
        let before = h.address.history_len();
        h.router.dispatch().await.unwrap();

        // Protected handler never ran; login rendered instead
        assert_eq!(h.invocations(), vec![("login".to_string(), vec![])]);
        assert_eq!(h.address.read(), paths::LOGIN);
        assert_eq!(h.address.history_len(), before);
    }

    #[tokio::test]
    async fn test_guard_passes_when_authenticated() {
        let mut h = Harness::new();
        h.track("/secret", "secret", false);
        h.sign_in();

        h.address.push("/secret");
        h.router.dispatch().await.unwrap();

        assert_eq!(h.invocations(), vec![("secret".to_string(), vec![])]);
    }

    #[tokio::test]
    async fn test_handler_failure_renders_error_screen() {
        let mut h = Harness::new();
        h.router
            .register_public("/broken", |_| async {
                Err(ShellError::Handler("view exploded".to_string()))
            })
            .unwrap();

        h.address.push("/broken");
        // Contained: dispatch itself succeeds
        h.router.dispatch().await.unwrap();

        assert!(h.error_screen.shown().is_some());
    }

    #[tokio::test]
    async fn test_missing_fallback_is_an_error() {
        let h = Harness::new();

        h.address.push("/no/routes/at/all");
        let err = h.router.dispatch().await.unwrap_err();

        assert!(matches!(err, ShellError::NoRoute(_)));
        assert!(h.error_screen.shown().is_some());
    }

    #[tokio::test]
    async fn test_guarded_login_route_trips_redirect_budget() {
        let mut h = Harness::new();
        // Misconfigured bootstrap: the login route itself is protected
        h.track(paths::LOGIN, "login", false);

        h.address.push("/secret");
        let err = h.router.dispatch().await.unwrap_err();
        assert!(matches!(err, ShellError::NoRoute(_)));
    }

    #[tokio::test]
    async fn test_navigate_pushes_and_dispatches() {
        let mut h = Harness::new();
        h.track(paths::HOME, "home", false);
        h.sign_in();

        h.router.navigate(paths::HOME).await.unwrap();

        assert_eq!(h.invocations(), vec![("home".to_string(), vec![])]);
        assert_eq!(h.address.read(), paths::HOME);
        assert_eq!(h.address.history_len(), 1);
    }

    #[tokio::test]
    async fn test_back_then_dispatch_rechecks_guards() {
        let mut h = Harness::new();
        h.track(paths::LOGIN, "login", true);
        h.track("/secret", "secret", false);
        h.sign_in();

        h.router.navigate("/secret").await.unwrap();
        h.router.navigate("/secret").await.unwrap();

        // Session ends, user presses back: the re-dispatch must guard
        h.session.set_session(None);
        h.router.back();
        h.router.dispatch().await.unwrap();

        let invocations = h.invocations();
        assert_eq!(invocations.last().unwrap().0, "login");
    }

    #[tokio::test]
    async fn test_generation_advances_per_dispatch() {
        let mut h = Harness::new();
        h.track(paths::HOME, "home", false);
        h.sign_in();

        h.router.navigate(paths::HOME).await.unwrap();
        let generation = h.router.generation();
        assert!(h.router.is_current(generation));

        h.router.navigate(paths::HOME).await.unwrap();
        assert!(!h.router.is_current(generation));
    }

    #[tokio::test]
    async fn test_root_route_dispatch() {
        let mut h = Harness::new();
        h.track(paths::ROOT, "root", false);
        h.sign_in();

        h.address.push("");
        h.router.dispatch().await.unwrap();

        assert_eq!(h.invocations(), vec![("root".to_string(), vec![])]);
    }
}
