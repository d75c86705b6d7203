//! Single-click / double-click disambiguation.
//!
//! Map SDKs deliver two `click` events before every `dblclick`. While
//! drawing, a click must not become a vertex if it turns out to be half
//! of a double click, so each click is parked here until its window
//! elapses. A double click cancels whatever is parked.
//!
//! Time is passed in explicitly so the owner decides how to wait: an
//! event loop sleeps until [`ClickDebouncer::deadline`] and then calls
//! [`ClickDebouncer::fire`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    due: Instant,
}

/// Holds at most one deferred click.
#[derive(Debug, Clone)]
pub struct ClickDebouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

impl<T> ClickDebouncer<T> {
    /// Creates a debouncer with the given wait window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Parks `value` until `now + window`.
    ///
    /// A click that was still parked is replaced and returned; it never
    /// fires.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        self.pending
            .replace(Pending {
                value,
                due: now + self.window,
            })
            .map(|p| p.value)
    }

    /// Drops the parked click, if any, and returns it.
    pub fn cancel_pending(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Releases the parked click if its window has elapsed at `now`.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// When the parked click becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Whether a click is parked.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn fires_only_after_window() {
        let t0 = Instant::now();
        let mut debouncer = ClickDebouncer::new(WINDOW);
        assert!(debouncer.schedule(1, t0).is_none());

        assert_eq!(debouncer.fire(t0 + Duration::from_millis(100)), None);
        assert_eq!(debouncer.deadline(), Some(t0 + WINDOW));
        assert_eq!(debouncer.fire(t0 + WINDOW), Some(1));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.fire(t0 + WINDOW * 4), None);
    }

    #[test]
    fn cancelled_click_never_fires() {
        let t0 = Instant::now();
        let mut debouncer = ClickDebouncer::new(WINDOW);
        debouncer.schedule("a", t0);
        assert_eq!(debouncer.cancel_pending(), Some("a"));
        assert_eq!(debouncer.fire(t0 + WINDOW * 2), None);
    }

    #[test]
    fn newer_click_replaces_parked_one() {
        let t0 = Instant::now();
        let mut debouncer = ClickDebouncer::new(WINDOW);
        debouncer.schedule(1, t0);
        assert_eq!(debouncer.schedule(2, t0 + Duration::from_millis(50)), Some(1));

        assert_eq!(debouncer.fire(t0 + WINDOW), None);
        assert_eq!(debouncer.fire(t0 + WINDOW + Duration::from_millis(50)), Some(2));
    }
}
