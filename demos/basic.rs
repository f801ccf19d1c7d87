//! Basic usage examples for ResourcePool

use esox_resourcepool::{PoolConfiguration, PoolError, ResourcePool};
use std::fmt::Write;
use std::time::Duration;

fn main() {
    println!("=== EsoxSolutions.ResourcePool - Basic Examples ===\n");

    // Example 1: Lazily created formatter buffers
    simple_pool();

    // Example 2: Reset hook
    reset_hook();

    // Example 3: Try and timeout methods
    try_methods();

    // Example 4: Metrics and health
    metrics_and_health();
}

fn simple_pool() {
    println!("1. Simple Pool:");
    let pool = ResourcePool::with_factory(3, || String::with_capacity(128)).unwrap();

    {
        let mut buf = pool.acquire().unwrap();
        write!(buf, "{:>8.3}", 3.14159).unwrap();
        println!("   Formatted into resource #{}: '{}'", buf.id(), *buf);
        // Resource automatically returned when dropped
    }

    println!("   Created: {}, idle after return: {}\n", pool.created_count(), pool.idle_count());
}

fn reset_hook() {
    println!("2. Reset Hook:");

    let config = PoolConfiguration::new()
        .with_max_pool_size(1)
        .with_factory(|| vec![0u8; 8])
        .with_reset(|buf: &mut Vec<u8>| buf.fill(0));
    let pool = ResourcePool::new(config).unwrap();

    let mut buf = pool.acquire().unwrap();
    buf.copy_from_slice(b"secret!!");
    let id = buf.id();
    pool.release(buf).unwrap();

    let buf = pool.acquire().unwrap();
    println!("   Same instance: {}", buf.id() == id);
    println!("   Contents after reset: {:?}\n", *buf);
}

fn try_methods() {
    println!("3. Try Methods:");
    let pool = ResourcePool::with_factory(1, || 42).unwrap();

    // Take the only resource
    let obj1 = pool.try_acquire();
    assert!(obj1.is_ok());
    println!("   First try: Success");

    // Try again while it is checked out
    match pool.try_acquire() {
        Err(PoolError::PoolEmpty) => println!("   Second try: pool empty"),
        other => println!("   Second try: {:?}", other.map(|o| *o)),
    }

    // Bounded wait
    match pool.acquire_timeout(Duration::from_millis(50)) {
        Err(e) => println!("   Timed acquire: {}", e),
        Ok(_) => println!("   Timed acquire: Success"),
    }

    drop(obj1); // Return resource

    let obj3 = pool.try_acquire();
    assert!(obj3.is_ok());
    println!("   Third try: Success\n");
}

fn metrics_and_health() {
    println!("4. Metrics and Health:");
    let pool = ResourcePool::with_factory(5, Vec::<u8>::new).unwrap();

    {
        let _obj1 = pool.acquire().unwrap();
        let _obj2 = pool.acquire().unwrap();

        let health = pool.health_status();
        println!("   Health: {}", if health.is_healthy { "Healthy" } else { "Unhealthy" });
        println!("   Utilization: {:.1}%", health.utilization * 100.0);
        println!("   Active: {}, Idle: {}", health.active_resources, health.idle_resources);
    }

    let metrics = pool.export_metrics();
    println!("\n   Metrics:");
    for (key, value) in metrics {
        println!("     {}: {}", key, value);
    }
}
