use std::time::{Duration, Instant};

use super::MemoryStats;

/// Log the time elapsed since `start` and return it.
pub fn log_elapsed(label: &str, start: Instant) -> Duration {
    let elapsed = start.elapsed();
    tracing::info!("{} took {:?}", label, elapsed);
    elapsed
}

/// Log process memory counters.
pub fn report_memory_usage(stats: &MemoryStats) {
    tracing::info!(
        "Memory: live={} bytes, peak={} bytes, freed={} bytes ({} allocs, {} frees)",
        stats.live_bytes,
        stats.peak_bytes,
        stats.total_freed_bytes,
        stats.allocations,
        stats.frees
    );
}

/// Logs the elapsed time for a scope when dropped.
pub struct ElapsedTimer {
    label: &'static str,
    start: Instant,
}

impl ElapsedTimer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        log_elapsed(self.label, self.start);
    }
}
