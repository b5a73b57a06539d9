//! Size-to-shard routing.
//!
//! Sizes are hashed rather than reduced modulo the shard count directly, so
//! that round sizes (powers of two, multiples of 1 KiB) spread across shards
//! instead of piling into a handful of them.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Number of shards in every pool.
pub const SHARD_COUNT: usize = 16;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Longest decimal rendering of a `u64`.
const MAX_DECIMAL_DIGITS: usize = 20;

/// Pure hash of a block size used for shard routing.
///
/// Implementations must be deterministic for the lifetime of the pool;
/// uniformity only affects lock contention, never correctness.
pub trait SizeHasher: Send + Sync {
    fn hash_size(&self, size: usize) -> u64;
}

/// 32-bit FNV-1a over the decimal text of the size. The default router.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1aDecimal;

impl SizeHasher for Fnv1aDecimal {
    #[inline]
    fn hash_size(&self, size: usize) -> u64 {
        let mut buf = [0u8; MAX_DECIMAL_DIGITS];
        fnv1a_32(decimal_digits(size as u64, &mut buf)) as u64
    }
}

/// FxHash of the size's native representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FxSizeHasher;

impl SizeHasher for FxSizeHasher {
    #[inline]
    fn hash_size(&self, size: usize) -> u64 {
        let mut hasher = FxHasher::default();
        size.hash(&mut hasher);
        hasher.finish()
    }
}

/// Route a size to its shard index in `[0, SHARD_COUNT)`.
#[inline]
pub fn shard_index<H: SizeHasher + ?Sized>(hasher: &H, size: usize) -> usize {
    (hasher.hash_size(size) % SHARD_COUNT as u64) as usize
}

/// 32-bit FNV-1a.
#[inline]
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ b as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Render `n` as ASCII decimal into the tail of `buf`, returning the digits.
#[inline]
fn decimal_digits(mut n: u64, buf: &mut [u8; MAX_DECIMAL_DIGITS]) -> &[u8] {
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[start..]
}
