//! Lock-free latency histogram for p50/p95/p99 percentile tracking.
//!
//! Pool operations complete in tens to hundreds of nanoseconds, so values are
//! recorded in nanoseconds into power-of-two buckets: bucket `i` holds values
//! in `[2^(i-1), 2^i)`, bucket 0 holds zero.

use std::sync::atomic::{AtomicU64, Ordering};

use super::LatencyPercentiles;

/// One bucket per bit of a `u64`.
const NUM_BUCKETS: usize = 64;

/// Latency histogram with logarithmic buckets.
pub struct LatencyHistogram {
    buckets: [AtomicU64; NUM_BUCKETS],
    count: AtomicU64,
    max: AtomicU64,
}

impl LatencyHistogram {
    /// Create a new empty histogram.
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            count: AtomicU64::new(0),
            max: AtomicU64::new(0),
        }
    }

    /// Record a latency value in nanoseconds.
    #[inline]
    pub fn record(&self, value_ns: u64) {
        self.buckets[Self::value_to_bucket(value_ns)].fetch_add(1, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.max.fetch_max(value_ns, Ordering::Relaxed);
    }

    #[inline]
    fn value_to_bucket(value_ns: u64) -> usize {
        ((u64::BITS - value_ns.leading_zeros()) as usize).min(NUM_BUCKETS - 1)
    }

    /// Lower bound of the values held by a bucket.
    #[inline]
    fn bucket_to_value(bucket: usize) -> u64 {
        if bucket == 0 {
            0
        } else {
            1u64 << (bucket - 1)
        }
    }

    /// Get total count of recorded values.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Calculate p50, p95, p99 percentiles.
    ///
    /// Concurrent writers may be mid-update; the result is approximate.
    pub fn percentiles(&self) -> LatencyPercentiles {
        let total = self.count.load(Ordering::Relaxed);
        if total == 0 {
            return LatencyPercentiles::default();
        }

        let targets = [
            total.div_ceil(2),
            (total * 95).div_ceil(100),
            (total * 99).div_ceil(100),
        ];
        let mut found: [Option<u64>; 3] = [None; 3];
        let mut cumulative = 0u64;

        for (idx, bucket) in self.buckets.iter().enumerate() {
            cumulative += bucket.load(Ordering::Relaxed);
            for (slot, &target) in found.iter_mut().zip(targets.iter()) {
                if slot.is_none() && cumulative >= target {
                    *slot = Some(Self::bucket_to_value(idx));
                }
            }
            if found[2].is_some() {
                break;
            }
        }

        let max = self.max.load(Ordering::Relaxed);
        LatencyPercentiles {
            count: total,
            p50: found[0].unwrap_or(max),
            p95: found[1].unwrap_or(max),
            p99: found[2].unwrap_or(max),
            max,
        }
    }

    /// Reset all buckets to zero.
    pub fn reset(&self) {
        for bucket in &self.buckets {
            bucket.store(0, Ordering::Relaxed);
        }
        self.count.store(0, Ordering::Relaxed);
        self.max.store(0, Ordering::Relaxed);
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}
