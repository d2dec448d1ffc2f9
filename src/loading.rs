//! Reference-counted loading overlay visibility
//!
//! Busy operations can nest (a login triggered from a view that is itself
//! loading data), so the overlay stays visible while any of them is in
//! flight. [`LoadingGauge`] counts acquisitions; the overlay widget behind
//! [`LoadingIndicator`] only ever sees show/hide.
//!
//! Prefer [`LoadingGauge::scoped`] over manual show/hide pairs: the
//! returned guard releases on every exit path, including early returns
//! and panics.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::surface::LoadingIndicator;

/// Counted visibility over a loading overlay
pub struct LoadingGauge {
    count: AtomicU32,
    indicator: Arc<dyn LoadingIndicator>,
}

impl LoadingGauge {
    pub fn new(indicator: Arc<dyn LoadingIndicator>) -> Self {
        Self {
            count: AtomicU32::new(0),
            indicator,
        }
    }

    /// Number of outstanding acquisitions
    pub fn active(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Increment the count and show the overlay with `message`
    pub fn show(&self, message: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.indicator.show(message);
    }

    /// Decrement the count, hiding the overlay when it reaches zero
    ///
    /// The count never goes below zero; unmatched hides are absorbed.
    pub fn hide(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                Some(count.saturating_sub(1))
            })
            .expect("fetch_update always succeeds");

        if previous <= 1 {
            self.indicator.hide();
        }
    }

    /// Reset the count to zero and hide the overlay
    ///
    /// Recovery hatch for a miscounted show/hide pairing.
    pub fn force_hide(&self) {
        let previous = self.count.swap(0, Ordering::SeqCst);
        if previous > 0 {
            tracing::warn!(outstanding = previous, "Loading overlay force-hidden");
        }
        self.indicator.hide();
    }

    /// Acquire the overlay for the current scope
    ///
    /// The overlay shows with `message` immediately and releases when the
    /// returned guard drops.
    #[must_use = "the overlay hides as soon as the guard is dropped"]
    pub fn scoped(&self, message: &str) -> LoadingGuard<'_> {
        self.show(message);
        LoadingGuard { gauge: self }
    }
}

/// Scoped acquisition of the loading overlay
///
/// Dropping the guard performs the matching [`LoadingGauge::hide`].
pub struct LoadingGuard<'a> {
    gauge: &'a LoadingGauge,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.gauge.hide();
    }
}
