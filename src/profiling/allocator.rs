//! Counting wrapper around the system allocator.
//!
//! Install it in a binary to get process-wide byte counts:
//!
//! ```rust,ignore
//! use blockpool::profiling::TrackingAllocator;
//!
//! #[global_allocator]
//! static GLOBAL: TrackingAllocator = TrackingAllocator::new();
//! ```
//!
//! Reallocation is counted as a free of the old size plus an allocation of
//! the new size.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

const RELAXED: Ordering = Ordering::Relaxed;

/// `GlobalAlloc` that forwards to `System` and keeps byte counters.
pub struct TrackingAllocator {
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    total_allocated: AtomicUsize,
    total_freed: AtomicUsize,
    allocations: AtomicUsize,
    frees: AtomicUsize,
}

impl TrackingAllocator {
    pub const fn new() -> Self {
        Self {
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
            total_allocated: AtomicUsize::new(0),
            total_freed: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn on_alloc(&self, size: usize) {
        self.allocations.fetch_add(1, RELAXED);
        self.total_allocated.fetch_add(size, RELAXED);
        let live = self.live_bytes.fetch_add(size, RELAXED).saturating_add(size);
        self.peak_bytes.fetch_max(live, RELAXED);
    }

    #[inline]
    fn on_free(&self, size: usize) {
        self.frees.fetch_add(1, RELAXED);
        self.total_freed.fetch_add(size, RELAXED);
        self.live_bytes.fetch_sub(size, RELAXED);
    }

    /// Current counter values.
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            live_bytes: self.live_bytes.load(RELAXED),
            peak_bytes: self.peak_bytes.load(RELAXED),
            total_allocated_bytes: self.total_allocated.load(RELAXED),
            total_freed_bytes: self.total_freed.load(RELAXED),
            allocations: self.allocations.load(RELAXED),
            frees: self.frees.load(RELAXED),
        }
    }
}

impl Default for TrackingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: every method forwards to `System` with the caller's arguments
// unchanged; the counters never influence the returned pointers.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: layout validity is the caller's contract.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: layout validity is the caller's contract.
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: ptr was returned by this allocator with this layout.
        unsafe { System.dealloc(ptr, layout) };
        self.on_free(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: ptr/layout/new_size satisfy the GlobalAlloc::realloc contract.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            self.on_free(layout.size());
            self.on_alloc(new_size);
        }
        new_ptr
    }
}

/// Process-wide allocation counters in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Bytes currently allocated.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
    /// Bytes ever allocated.
    pub total_allocated_bytes: usize,
    /// Bytes ever freed.
    pub total_freed_bytes: usize,
    /// Number of allocations.
    pub allocations: usize,
    /// Number of frees.
    pub frees: usize,
}
