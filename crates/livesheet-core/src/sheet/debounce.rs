//! Timer-based coalescing buffer for text edits.

use std::time::{Duration, Instant};

/// Holds the latest edit until the field has been quiet for `window`.
#[derive(Debug)]
pub(crate) struct Debounce<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub(crate) fn new(window: Duration) -> Self {
        Debounce {
            window,
            pending: None,
        }
    }

    /// Replace any pending value and restart the quiet period.
    pub(crate) fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending value regardless of its deadline.
    pub(crate) fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins_and_restarts_window() {
        let t0 = Instant::now();
        let mut field = Debounce::new(Duration::from_millis(250));

        field.push("1", t0);
        field.push("1 +", t0 + Duration::from_millis(100));
        field.push("1 + 2", t0 + Duration::from_millis(200));

        assert_eq!(field.deadline(), Some(t0 + Duration::from_millis(450)));
        assert_eq!(field.take(), Some("1 + 2"));
        assert_eq!(field.take(), None);
        assert_eq!(field.deadline(), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut field = Debounce::new(Duration::from_millis(250));
        field.push(1, Instant::now());
        field.cancel();
        assert_eq!(field.take(), None);
    }
}
