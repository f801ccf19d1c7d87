// EsoxSolutions.ResourcePool
// Bounded, blocking, thread-safe resource pool

// This is just a binary wrapper - the actual library is in lib.rs
// Run demos with: cargo run --example basic

use esox_resourcepool::{PoolConfiguration, PoolResult, ResourcePool};
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() -> PoolResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== EsoxSolutions.ResourcePool ===");
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!();

    // Quick demo: four workers sharing two scratch buffers
    println!("Quick Demo:");
    let config = PoolConfiguration::new()
        .with_name("scratch")
        .with_max_pool_size(2)
        .with_factory(|| String::with_capacity(256))
        .with_reset(|s: &mut String| s.clear());
    let pool = ResourcePool::new(config)?;

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let pool = pool.clone();
            thread::spawn(move || -> PoolResult<()> {
                let mut buf = pool.acquire()?;
                buf.push_str(&format!("worker {worker}"));
                println!("  {} used buffer #{}", *buf, buf.id());
                buf.release()
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked")?;
    }

    println!("  Buffers created: {}", pool.created_count());
    Ok(())
}
