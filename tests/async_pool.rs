//! Async acquire paths and their interaction with blocking callers.

use esox_resourcepool::{PoolConfiguration, PoolError, ResourcePool};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counting_pool(capacity: usize) -> (ResourcePool<usize>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let pool = ResourcePool::with_factory(capacity, move || counter.fetch_add(1, Ordering::SeqCst))
        .unwrap();
    (pool, calls)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_tasks_share_bounded_resources() {
    let (pool, calls) = counting_pool(3);
    let in_use = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let pool = pool.clone();
            let in_use = Arc::clone(&in_use);
            tokio::spawn(async move {
                for _ in 0..20 {
                    let obj = pool.acquire_async().await.unwrap();
                    let now = in_use.fetch_add(1, Ordering::SeqCst) + 1;
                    assert!(now <= 3);
                    tokio::task::yield_now().await;
                    in_use.fetch_sub(1, Ordering::SeqCst);
                    obj.release().unwrap();
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert!(calls.load(Ordering::SeqCst) <= 3);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.waiter_count(), 0);
}

#[tokio::test]
async fn cancelled_wait_keeps_accounting_intact() {
    let (pool, calls) = counting_pool(1);
    let held = pool.acquire_async().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire_async().await.map(|obj| obj.id()) })
    };
    while pool.waiter_count() == 0 {
        tokio::task::yield_now().await;
    }

    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());
    assert_eq!(pool.waiter_count(), 0);

    drop(held);
    assert_eq!(pool.idle_count(), 1);
    assert_eq!(pool.acquire_async().await.unwrap().id(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wait_cancelled_after_handoff_returns_resource() {
    let (pool, calls) = counting_pool(1);
    let held = pool.acquire_async().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire_async().await.map(|obj| obj.id()) })
    };
    while pool.waiter_count() == 0 {
        tokio::task::yield_now().await;
    }

    // The release reaches the waiter before it gets a chance to run
    drop(held);
    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());

    assert_eq!(pool.idle_count(), 1);
    assert_eq!(pool.waiter_count(), 0);
    assert_eq!(pool.created_count(), 1);
    assert_eq!(pool.try_acquire().unwrap().id(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn async_timeout_reports_requested_duration() {
    let (pool, _) = counting_pool(1);
    let _held = pool.acquire_async().await.unwrap();

    let err = pool
        .acquire_timeout_async(Duration::from_millis(30))
        .await
        .unwrap_err();

    assert!(matches!(err, PoolError::Timeout(t) if t == Duration::from_millis(30)));
    assert_eq!(pool.metrics().timeouts, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_release_wakes_async_waiter() {
    let (pool, _) = counting_pool(1);
    let held = pool.acquire().unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire_async().await.map(|obj| obj.id()) })
    };
    while pool.waiter_count() == 0 {
        tokio::task::yield_now().await;
    }

    let releaser = std::thread::spawn(move || held.release());
    releaser.join().unwrap().unwrap();

    assert_eq!(waiter.await.unwrap().unwrap(), 0);
}

#[tokio::test]
async fn warmup_from_configuration() {
    let config = PoolConfiguration::new()
        .with_max_pool_size(4)
        .with_warmup(2)
        .with_factory(|| [0u8; 32]);
    let pool = ResourcePool::new(config).unwrap();

    assert_eq!(pool.idle_count(), 2);
    assert_eq!(pool.warmup_async(10).await.unwrap(), 2);
    assert_eq!(pool.created_count(), 4);
}
