//! Host-page boundary — the traits the surrounding page implements
//!
//! The shell never touches the document directly. Address fragment,
//! toasts, the loading overlay, and the generic error view are owned by
//! the host and reached through the traits here. In-memory
//! implementations back tests and headless development.

use std::sync::{Arc, Mutex};

use crate::loading::LoadingGauge;

/// The addressable fragment of the host page
///
/// `read` returns the current fragment path (e.g. `/tournament/42`,
/// empty string when unset). `replace` overwrites the current history
/// entry and is used for every redirect the user did not initiate;
/// `push` adds a new entry for user-initiated navigation.
pub trait AddressBar: Send + Sync {
    /// Current fragment path
    fn read(&self) -> String;

    /// Navigate to `path`, adding a history entry
    fn push(&self, path: &str);

    /// Navigate to `path`, overwriting the current history entry
    fn replace(&self, path: &str);

    /// Step back one history entry
    fn back(&self);
}

/// User-visible notices (toast boundary)
pub trait Notices: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// Generic error view with a return-home action
pub trait ErrorScreen: Send + Sync {
    fn show(&self, message: &str);
}

/// Raw loading overlay widget
///
/// Visibility policy (reference counting) lives in [`LoadingGauge`];
/// implementations only show and hide.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self, message: &str);

    fn hide(&self);
}

/// Shared handles to the host-page boundaries
///
/// Built once at startup and cloned into every component that needs the
/// page — the shell's replacement for module-level globals.
#[derive(Clone)]
pub struct Surface {
    pub address: Arc<dyn AddressBar>,
    pub notices: Arc<dyn Notices>,
    pub error_screen: Arc<dyn ErrorScreen>,
    pub loading: Arc<LoadingGauge>,
}

impl Surface {
    /// Surface backed entirely by in-memory implementations
    pub fn in_memory() -> Self {
        Self {
            address: Arc::new(MemoryAddressBar::default()),
            notices: Arc::new(MemoryNotices::default()),
            error_screen: Arc::new(MemoryErrorScreen::default()),
            loading: Arc::new(LoadingGauge::new(Arc::new(
                MemoryLoadingIndicator::default(),
            ))),
        }
    }
}

/// In-memory address bar with a real history stack
///
/// Tracks entries and a cursor so tests can assert on push/replace/back
/// behaviour.
#[derive(Default)]
pub struct MemoryAddressBar {
    inner: Mutex<AddressState>,
}

#[derive(Default)]
struct AddressState {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryAddressBar {
    /// Address bar starting at `path`
    pub fn starting_at(path: &str) -> Self {
        let bar = Self::default();
        bar.push(path);
        bar
    }

    /// Number of history entries
    pub fn history_len(&self) -> usize {
        self.inner.lock().expect("address lock").entries.len()
    }

    /// Snapshot of the history entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.inner.lock().expect("address lock").entries.clone()
    }
}

impl AddressBar for MemoryAddressBar {
    fn read(&self) -> String {
        let state = self.inner.lock().expect("address lock");
        state
            .entries
            .get(state.cursor)
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, path: &str) {
        let mut state = self.inner.lock().expect("address lock");
        if !state.entries.is_empty() {
            // Forward history is discarded, as in a real address bar
            let cursor = state.cursor;
            state.entries.truncate(cursor + 1);
        }
        state.entries.push(path.to_string());
        state.cursor = state.entries.len() - 1;
    }

    fn replace(&self, path: &str) {
        let mut state = self.inner.lock().expect("address lock");
        if state.entries.is_empty() {
            state.entries.push(path.to_string());
            state.cursor = 0;
        } else {
            let cursor = state.cursor;
            state.entries[cursor] = path.to_string();
        }
    }

    fn back(&self) {
        let mut state = self.inner.lock().expect("address lock");
        state.cursor = state.cursor.saturating_sub(1);
    }
}

/// Notice kind recorded by [`MemoryNotices`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// In-memory toast recorder
#[derive(Default)]
pub struct MemoryNotices {
    recorded: Mutex<Vec<(NoticeKind, String)>>,
}

impl MemoryNotices {
    /// All notices in emission order
    pub fn recorded(&self) -> Vec<(NoticeKind, String)> {
        self.recorded.lock().expect("notices lock").clone()
    }

    /// Most recent error notice, if any
    pub fn last_error(&self) -> Option<String> {
        self.recorded()
            .into_iter()
            .rev()
            .find(|(kind, _)| *kind == NoticeKind::Error)
            .map(|(_, message)| message)
    }

    /// Most recent success notice, if any
    pub fn last_success(&self) -> Option<String> {
        self.recorded()
            .into_iter()
            .rev()
            .find(|(kind, _)| *kind == NoticeKind::Success)
            .map(|(_, message)| message)
    }
}

impl Notices for MemoryNotices {
    fn success(&self, message: &str) {
        tracing::debug!(%message, "Success notice");
        self.recorded
            .lock()
            .expect("notices lock")
            .push((NoticeKind::Success, message.to_string()));
    }

    fn error(&self, message: &str) {
        tracing::debug!(%message, "Error notice");
        self.recorded
            .lock()
            .expect("notices lock")
            .push((NoticeKind::Error, message.to_string()));
    }
}

/// In-memory error view recorder
#[derive(Default)]
pub struct MemoryErrorScreen {
    shown: Mutex<Option<String>>,
}

impl MemoryErrorScreen {
    /// Message last rendered, if the error view was shown
    pub fn shown(&self) -> Option<String> {
        self.shown.lock().expect("error screen lock").clone()
    }
}

impl ErrorScreen for MemoryErrorScreen {
    fn show(&self, message: &str) {
        *self.shown.lock().expect("error screen lock") = Some(message.to_string());
    }
}

/// In-memory loading overlay
#[derive(Default)]
pub struct MemoryLoadingIndicator {
    state: Mutex<IndicatorState>,
}

#[derive(Default)]
struct IndicatorState {
    visible: bool,
    message: Option<String>,
}

impl MemoryLoadingIndicator {
    pub fn visible(&self) -> bool {
        self.state.lock().expect("indicator lock").visible
    }

    /// Message shown with the overlay, if visible
    pub fn message(&self) -> Option<String> {
        self.state.lock().expect("indicator lock").message.clone()
    }
}

impl LoadingIndicator for MemoryLoadingIndicator {
    fn show(&self, message: &str) {
        let mut state = self.state.lock().expect("indicator lock");
        state.visible = true;
        state.message = Some(message.to_string());
    }

    fn hide(&self) {
        let mut state = self.state.lock().expect("indicator lock");
        state.visible = false;
        state.message = None;
    }
}
