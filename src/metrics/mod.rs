//! Allocation and reuse accounting for a pool.
//!
//! Every counter is a standalone atomic updated with relaxed ordering; there
//! is no lock on the get/put path. A snapshot loads each field on its own,
//! so under concurrent writers it can show a torn view across fields. That
//! is fine for monitoring and not meant for correctness decisions.

mod histogram;

pub use histogram::LatencyHistogram;

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Relaxed ordering for counters (eventual visibility is fine for metrics).
const RELAXED: Ordering = Ordering::Relaxed;

/// Counters and timers owned by one pool.
pub struct MetricsRecorder {
    /// Blocks handed out by `get` (fresh or reused)
    allocations: AtomicU64,
    /// Blocks accepted back by `put`
    reuses: AtomicU64,
    /// allocations - reuses
    active_blocks: AtomicI64,
    /// Blocks dropped by `put` because no sub-pool matched their capacity
    discards: AtomicU64,

    /// Total time spent in `get`, nanoseconds
    allocation_time_ns: AtomicU64,
    /// Total time spent in accepted `put`s, nanoseconds
    reuse_time_ns: AtomicU64,

    get_latency: LatencyHistogram,
    put_latency: LatencyHistogram,
}

impl MetricsRecorder {
    /// Create a recorder with all counters at zero.
    pub fn new() -> Self {
        Self {
            allocations: AtomicU64::new(0),
            reuses: AtomicU64::new(0),
            active_blocks: AtomicI64::new(0),
            discards: AtomicU64::new(0),
            allocation_time_ns: AtomicU64::new(0),
            reuse_time_ns: AtomicU64::new(0),
            get_latency: LatencyHistogram::new(),
            put_latency: LatencyHistogram::new(),
        }
    }

    /// Count a block handed out.
    #[inline]
    pub(crate) fn record_allocation(&self) {
        self.allocations.fetch_add(1, RELAXED);
        self.active_blocks.fetch_add(1, RELAXED);
    }

    /// Count a block taken back.
    #[inline]
    pub(crate) fn record_reuse(&self) {
        self.reuses.fetch_add(1, RELAXED);
        self.active_blocks.fetch_sub(1, RELAXED);
    }

    /// Count a returned block that no sub-pool would take.
    #[inline]
    pub(crate) fn record_discard(&self) {
        self.discards.fetch_add(1, RELAXED);
    }

    #[inline]
    pub(crate) fn add_allocation_time(&self, elapsed: Duration) {
        let ns = duration_nanos(elapsed);
        self.allocation_time_ns.fetch_add(ns, RELAXED);
        self.get_latency.record(ns);
    }

    #[inline]
    pub(crate) fn add_reuse_time(&self, elapsed: Duration) {
        let ns = duration_nanos(elapsed);
        self.reuse_time_ns.fetch_add(ns, RELAXED);
        self.put_latency.record(ns);
    }

    /// Get a point-in-time snapshot. Fields are read independently.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            allocations: self.allocations.load(RELAXED),
            reuses: self.reuses.load(RELAXED),
            active_blocks: self.active_blocks.load(RELAXED),
            discards: self.discards.load(RELAXED),
            allocation_time: Duration::from_nanos(self.allocation_time_ns.load(RELAXED)),
            reuse_time: Duration::from_nanos(self.reuse_time_ns.load(RELAXED)),
            get_latency: self.get_latency.percentiles(),
            put_latency: self.put_latency.percentiles(),
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Latency percentiles in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub count: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub max: u64,
}

/// Point-in-time snapshot of pool metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub allocations: u64,
    pub reuses: u64,
    /// Approximate count of blocks currently checked out. Can go negative if
    /// callers put blocks the pool never handed out.
    pub active_blocks: i64,
    pub discards: u64,

    pub allocation_time: Duration,
    pub reuse_time: Duration,

    pub get_latency: LatencyPercentiles,
    pub put_latency: LatencyPercentiles,
}

impl MetricsSnapshot {
    /// Fraction of handed-out blocks that came back (0.0 to 1.0).
    pub fn reuse_ratio(&self) -> f64 {
        if self.allocations == 0 {
            0.0
        } else {
            self.reuses as f64 / self.allocations as f64
        }
    }

    /// Mean time per `get`.
    pub fn avg_allocation_time(&self) -> Duration {
        match u32::try_from(self.allocations) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.allocation_time / n,
            Err(_) => Duration::from_nanos(
                (self.allocation_time.as_nanos() / self.allocations as u128) as u64,
            ),
        }
    }

    /// Format as INFO-style `key:value` sections.
    ///
    /// `section` selects one of `blocks`, `timing` or `latency`; `None`
    /// renders all of them.
    pub fn to_report_string(&self, section: Option<&str>) -> String {
        let mut out = String::with_capacity(512);

        let include_all = section.is_none();
        let section = section.unwrap_or("");

        if include_all || section.eq_ignore_ascii_case("blocks") {
            out.push_str("# Blocks\n");
            out.push_str(&format!("allocations:{}\n", self.allocations));
            out.push_str(&format!("reuses:{}\n", self.reuses));
            out.push_str(&format!("active_blocks:{}\n", self.active_blocks));
            out.push_str(&format!("discards:{}\n", self.discards));
            out.push_str(&format!("reuse_ratio:{:.4}\n", self.reuse_ratio()));
            out.push('\n');
        }

        if include_all || section.eq_ignore_ascii_case("timing") {
            out.push_str("# Timing\n");
            out.push_str(&format!("total_allocation_time:{:?}\n", self.allocation_time));
            out.push_str(&format!("total_reuse_time:{:?}\n", self.reuse_time));
            out.push_str(&format!("avg_allocation_time:{:?}\n", self.avg_allocation_time()));
            out.push('\n');
        }

        if include_all || section.eq_ignore_ascii_case("latency") {
            out.push_str("# Latency (nanoseconds)\n");
            for (name, p) in [("get", &self.get_latency), ("put", &self.put_latency)] {
                out.push_str(&format!("{}_p50:{}\n", name, p.p50));
                out.push_str(&format!("{}_p95:{}\n", name, p.p95));
                out.push_str(&format!("{}_p99:{}\n", name, p.p99));
                out.push_str(&format!("{}_max:{}\n", name, p.max));
            }
            out.push('\n');
        }

        out
    }
}
