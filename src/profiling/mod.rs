//! Process-level profiling helpers: allocator byte counters and elapsed-time
//! logging. Nothing here reads pool state.

mod allocator;
mod report;

pub use allocator::{MemoryStats, TrackingAllocator};
pub use report::{log_elapsed, report_memory_usage, ElapsedTimer};
