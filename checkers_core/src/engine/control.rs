//! Cooperative stop signals shared between a host and a running search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag. Cloning yields another handle to the same flag,
/// so the host keeps one clone and hands the other to the search.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Wall-clock budget for one search, measured on a monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SearchClock {
    started: Instant,
    time_limit: Option<Duration>,
}

impl SearchClock {
    pub fn start(time_limit_ms: Option<u64>) -> Self {
        Self {
            started: Instant::now(),
            time_limit: time_limit_ms.map(Duration::from_millis),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    pub fn expired(&self) -> bool {
        self.time_limit.is_some_and(|limit| self.elapsed() > limit)
    }

    pub fn elapsed_whole_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
