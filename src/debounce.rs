use std::time::{Duration, Instant};

/// Trailing-edge debouncer.
///
/// Each `trigger` replaces whatever was pending and restarts the quiet
/// period. `poll` hands back the latest value once the quiet period has
/// elapsed without a newer trigger. At most one value is ever pending;
/// superseded values are dropped.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn trigger(&mut self, value: T) {
        self.trigger_at(value, Instant::now());
    }

    /// Trigger at a specific time (for testing).
    pub fn trigger_at(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    /// Poll at a specific time (for testing).
    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let (_, triggered) = self.pending.as_ref()?;
        if now.saturating_duration_since(*triggered) < self.quiet {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|(_, triggered)| *triggered + self.quiet)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}
