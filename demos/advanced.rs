//! Advanced features: fallible hooks, blocking handoff, Prometheus export

use esox_resourcepool::{IdleOrder, PoolConfiguration, PoolError, ResourcePool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug)]
struct Connection {
    id: usize,
    healthy: bool,
}

impl Connection {
    fn open(id: usize) -> Result<Self, String> {
        if id == 0 {
            Err("first dial always fails".to_string())
        } else {
            Ok(Self { id, healthy: true })
        }
    }
}

fn main() {
    println!("=== EsoxSolutions.ResourcePool - Advanced Features ===\n");

    // Example 1: Fallible factory
    fallible_factory();

    // Example 2: Fallible reset
    fallible_reset();

    // Example 3: Blocking handoff between threads
    blocking_handoff();

    // Example 4: Prometheus metrics
    prometheus_export();
}

fn connection_pool(capacity: usize) -> ResourcePool<Connection> {
    let dials = Arc::new(AtomicUsize::new(0));
    let config = PoolConfiguration::new()
        .with_name("connections")
        .with_max_pool_size(capacity)
        .with_idle_order(IdleOrder::Fifo)
        .with_fallible_factory(move || Connection::open(dials.fetch_add(1, Ordering::SeqCst)))
        .with_fallible_reset(|conn: &mut Connection| {
            if conn.healthy { Ok(()) } else { Err(format!("connection {} is broken", conn.id)) }
        });
    ResourcePool::new(config).unwrap()
}

fn fallible_factory() {
    println!("1. Fallible Factory:");
    let pool = connection_pool(1);

    match pool.acquire() {
        Err(PoolError::FactoryFailed(e)) => println!("   First acquire failed: {}", e),
        other => println!("   Unexpected: {:?}", other),
    }

    // The failed attempt did not use up the only slot
    let conn = pool.acquire().unwrap();
    println!("   Retry got: {:?}\n", *conn);
}

fn fallible_reset() {
    println!("2. Fallible Reset:");
    let pool = connection_pool(1);

    // The first dial always fails; it leaves the slot free
    if let Err(e) = pool.acquire() {
        println!("   Warm-up dial: {}", e);
    }

    let mut conn = pool.acquire().unwrap();
    conn.healthy = false;

    if let Err(e) = pool.release(conn) {
        println!("   Release: {}", e);
    }
    println!("   Created after discard: {}", pool.created_count());

    let conn = pool.acquire().unwrap();
    println!("   Replacement: {:?}\n", *conn);
}

fn blocking_handoff() {
    println!("3. Blocking Handoff:");
    let pool = ResourcePool::with_factory(1, || 0u32).unwrap();
    let held = pool.acquire().unwrap();

    let waiter = {
        let pool = pool.clone();
        thread::spawn(move || {
            let obj = pool.acquire().unwrap();
            println!("   Waiter got resource #{}", obj.id());
        })
    };

    thread::sleep(Duration::from_millis(50));
    println!("   Waiters queued: {}", pool.waiter_count());
    drop(held);
    waiter.join().unwrap();

    println!("   Resources created: {}\n", pool.created_count());
}

fn prometheus_export() {
    println!("4. Prometheus Metrics Export:");

    let pool = ResourcePool::new(
        PoolConfiguration::new()
            .with_name("example_pool")
            .with_max_pool_size(5)
            .with_factory(String::new),
    )
    .unwrap();

    // Use some resources
    {
        let _obj1 = pool.acquire().unwrap();
        let _obj2 = pool.acquire().unwrap();

        let mut tags = std::collections::HashMap::new();
        tags.insert("service".to_string(), "example".to_string());
        tags.insert("env".to_string(), "dev".to_string());

        match pool.export_metrics_prometheus(Some(&tags)) {
            Ok(text) => println!("{}", text),
            Err(e) => println!("   Export failed: {}", e),
        }
    }
}
