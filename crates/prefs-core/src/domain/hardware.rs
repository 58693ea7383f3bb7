//! Host CPU parallelism used to bound the thread-count setting.

use std::thread;

/// Parallelism limits of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareInfo {
    /// Upper bound for the thread-count setting.
    pub ideal_thread_count: i64,
    /// Number of hardware threads; feeds the thread-count default.
    pub hardware_concurrency: i64,
}

impl HardwareInfo {
    /// Queries the host.  Falls back to a single thread when the platform
    /// cannot report its parallelism.
    pub fn detect() -> Self {
        let n = thread::available_parallelism()
            .map(|n| n.get() as i64)
            .unwrap_or(1);
        Self {
            ideal_thread_count: n,
            hardware_concurrency: n,
        }
    }

    /// Thread count used when nothing valid is stored: at most 4.
    pub fn default_thread_count(&self) -> i64 {
        self.hardware_concurrency.min(4)
    }

    /// Normalizes a requested or stored thread count.
    ///
    /// Values `<= 0` are treated as unset and replaced with
    /// [`default_thread_count`](Self::default_thread_count); the result is
    /// then clamped to `[1, ideal_thread_count]`.
    pub fn normalize_thread_count(&self, requested: i64) -> i64 {
        let c = if requested <= 0 {
            self.default_thread_count()
        } else {
            requested
        };
        c.max(1).min(self.ideal_thread_count.max(1))
    }
}
