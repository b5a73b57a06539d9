use std::time::Instant;

use blockpool::config::Config;
use blockpool::engine::ShardedPool;
use blockpool::persistence::persist_block;
use blockpool::profiling::{log_elapsed, report_memory_usage, ElapsedTimer, TrackingAllocator};

use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator::new();

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration
    let config = Config::parse_args();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("blockpool v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: sizes={:?}, iterations={}, threads={}, max_idle={:?}",
        config.sizes, config.iterations, config.threads, config.max_idle
    );

    let pool = ShardedPool::with_config(config.pool_config()?)?;

    // One block per configured size
    let mut blocks: Vec<_> = config.sizes.iter().map(|&size| pool.get(size)).collect();
    for block in &blocks {
        info!("Allocated block of {} bytes", block.len());
    }

    let start = Instant::now();

    // Return the first block, then hammer its size so the freelist is exercised
    let reuse_size = config.sizes[0];
    let first = blocks.remove(0);
    pool.put(first);
    info!("Returned {} byte block to the pool", reuse_size);

    for _ in 0..config.iterations {
        let block = pool.get(reuse_size);
        pool.put(block);
    }
    log_elapsed("Reuse loop", start);

    {
        let _timer = ElapsedTimer::start("Concurrent phase");
        std::thread::scope(|s| {
            for t in 0..config.threads {
                let pool = &pool;
                let sizes = &config.sizes;
                let iterations = config.iterations;
                s.spawn(move || {
                    for i in 0..iterations {
                        let size = sizes[(t + i) % sizes.len()];
                        let block = pool.get(size);
                        pool.put(block);
                    }
                });
            }
        });
    }

    report_memory_usage(&GLOBAL.stats());

    if let Some(sample) = blocks.first() {
        match persist_block(&config.output, sample) {
            Ok(()) => info!(
                "Persisted {} byte block to {:?}",
                sample.len(),
                config.output
            ),
            Err(e) => error!("Failed to persist block: {}", e),
        }
    }

    for block in blocks {
        pool.put(block);
    }

    let snapshot = pool.metrics().snapshot();
    let stats = pool.stats();
    info!(
        "{} sub-pools holding {} idle blocks",
        stats.sub_pools, stats.idle_blocks
    );
    for s in &stats.per_size {
        info!(
            "  {} bytes: idle={} hits={} misses={} hit_rate={:.3}",
            s.size,
            s.idle,
            s.hits,
            s.misses,
            s.hit_rate()
        );
    }
    print!("{}", snapshot.to_report_string(None));

    Ok(())
}
