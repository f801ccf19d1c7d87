//! Async usage examples

use esox_resourcepool::{PoolConfiguration, ResourcePool};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() {
    println!("=== EsoxSolutions.ResourcePool - Async Examples ===\n");

    // Example 1: Async acquire
    async_acquire().await;

    // Example 2: Async with timeout
    async_with_timeout().await;

    // Example 3: Warmup
    warmup().await;

    // Example 4: Concurrent access
    concurrent_access().await;
}

async fn async_acquire() {
    println!("1. Async Acquire:");
    let pool = ResourcePool::with_factory(3, || 7u64).unwrap();

    {
        let obj = pool.acquire_async().await.unwrap();
        println!("   Got resource asynchronously: {}", *obj);
    }

    println!();
}

async fn async_with_timeout() {
    println!("2. Async with Timeout:");

    let pool = ResourcePool::with_factory(1, || 42).unwrap();

    // Take the only resource
    let _obj = pool.acquire().unwrap();

    // Try to get another (should time out)
    let result = pool.acquire_timeout_async(Duration::from_millis(100)).await;
    match result {
        Ok(_) => println!("   Got resource"),
        Err(e) => println!("   Error: {}", e),
    }

    println!();
}

async fn warmup() {
    println!("3. Pool with Warmup:");

    let pool = ResourcePool::new(
        PoolConfiguration::new()
            .with_max_pool_size(10)
            .with_factory(|| {
                println!("   Creating new resource...");
                vec![0u8; 1024]
            }),
    )
    .unwrap();

    println!("   Warming up pool with 5 resources...");
    pool.warmup_async(5).await.unwrap();
    println!("   Idle after warmup: {}", pool.health_status().idle_resources);

    // Acquire (should not create a new one)
    {
        let obj = pool.acquire_async().await.unwrap();
        println!("   Got pre-created resource #{}", obj.id());
    }

    println!();
}

async fn concurrent_access() {
    println!("4. Concurrent Access:");

    let pool = ResourcePool::with_factory(3, String::new).unwrap();

    let mut handles = vec![];

    for i in 0..10 {
        let pool = pool.clone();
        let handle = tokio::spawn(async move {
            let mut obj = pool.acquire_async().await.unwrap();
            obj.clear();
            obj.push_str(&format!("task {}", i));
            println!("   Task {} got resource #{}", i, obj.id());
            sleep(Duration::from_millis(50)).await;
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.unwrap();
    }

    println!("   Created: {}, waits: {}", pool.created_count(), pool.metrics().wait_events);
}
