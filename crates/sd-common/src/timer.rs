//! Scope-exit timers.
//!
//! A [`ScopedTimer`] starts when it is created and hands the elapsed
//! [`Duration`] to its callback exactly once: on an explicit [`ScopedTimer::end`]
//! or when it is dropped, whichever comes first.
//!
//! ```
//! use sd_common::timer;
//!
//! let mut reported = None;
//! {
//!     let _t = timer(|elapsed| reported = Some(elapsed));
//! }
//! assert!(reported.is_some());
//! ```

use std::time::{Duration, Instant};

/// Runs a callback with the elapsed time when it goes out of scope.
#[must_use = "the timer reports as soon as it is dropped"]
pub struct ScopedTimer<F: FnOnce(Duration)> {
    start: Instant,
    out: Option<F>,
}

impl<F: FnOnce(Duration)> ScopedTimer<F> {
    /// Start a timer that reports to `out`.
    pub fn new(out: F) -> Self {
        Self {
            start: Instant::now(),
            out: Some(out),
        }
    }

    /// Time since the timer was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whether the callback has not fired yet.
    pub fn is_running(&self) -> bool {
        self.out.is_some()
    }

    /// Report now. Later calls and the eventual drop are no-ops.
    pub fn end(&mut self) {
        if let Some(out) = self.out.take() {
            out(self.elapsed());
        }
    }
}

impl<F: FnOnce(Duration)> Drop for ScopedTimer<F> {
    fn drop(&mut self) {
        self.end();
    }
}

/// Start a [`ScopedTimer`].
pub fn timer<F: FnOnce(Duration)>(out: F) -> ScopedTimer<F> {
    ScopedTimer::new(out)
}

/// Time the rest of the enclosing scope and emit a `debug` event with the
/// result in milliseconds.
///
/// ```ignore
/// let _timer = sd_common::debug_timer!("resolve parameters");
/// ```
#[macro_export]
macro_rules! debug_timer {
    ($label:expr) => {
        $crate::timer::timer(|elapsed: ::std::time::Duration| {
            $crate::__tracing::debug!(
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "T({}) = {:.6}ms",
                $label,
                elapsed.as_secs_f64() * 1e3
            );
        })
    };
}
