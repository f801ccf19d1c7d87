//! Core resource pool implementation

use crate::config::{FactoryFn, IdleOrder, PoolConfiguration, ResetFn};
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{MetricsTracker, PoolGauges, PoolMetrics};

use crossbeam::channel::{self, RecvTimeoutError};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// An idle resource and the id it was given at creation
struct IdleEntry<T> {
    value: T,
    id: usize,
}

/// What a releasing thread passes to a waiting one
enum Handoff<T> {
    /// A ready resource
    Resource(IdleEntry<T>),

    /// Permission to create a resource in a slot that is already counted
    Slot,
}

enum WaiterTx<T> {
    Blocking(channel::Sender<Handoff<T>>),
    Async(oneshot::Sender<Handoff<T>>),
}

struct Waiter<T> {
    id: u64,
    tx: WaiterTx<T>,
}

impl<T> Waiter<T> {
    /// Deliver the handoff, giving it back if the waiter has gone away
    fn deliver(self, handoff: Handoff<T>) -> Result<(), Handoff<T>> {
        match self.tx {
            WaiterTx::Blocking(tx) => tx.try_send(handoff).map_err(|e| e.into_inner()),
            WaiterTx::Async(tx) => tx.send(handoff),
        }
    }
}

/// Everything guarded by the pool mutex
struct PoolState<T> {
    idle: VecDeque<IdleEntry<T>>,
    /// Resources in circulation plus slots reserved for in-progress creation
    created: usize,
    waiters: VecDeque<Waiter<T>>,
    next_waiter_id: u64,
}

/// Outcome of trying to satisfy an acquire without waiting
enum Claim<T> {
    Idle(IdleEntry<T>),
    Slot,
    Exhausted,
}

impl<T> PoolState<T> {
    fn new(capacity: usize) -> Self {
        Self {
            idle: VecDeque::with_capacity(capacity),
            created: 0,
            waiters: VecDeque::new(),
            next_waiter_id: 0,
        }
    }

    fn claim(&mut self, capacity: usize, order: IdleOrder) -> Claim<T> {
        let entry = match order {
            IdleOrder::Lifo => self.idle.pop_back(),
            IdleOrder::Fifo => self.idle.pop_front(),
        };

        if let Some(entry) = entry {
            Claim::Idle(entry)
        } else if self.created < capacity {
            self.created += 1;
            Claim::Slot
        } else {
            Claim::Exhausted
        }
    }

    fn enqueue(&mut self, tx: WaiterTx<T>) -> u64 {
        let id = self.next_waiter_id;
        self.next_waiter_id = self.next_waiter_id.wrapping_add(1);
        self.waiters.push_back(Waiter { id, tx });
        id
    }

    fn withdraw(&mut self, waiter_id: u64) {
        if let Some(pos) = self.waiters.iter().position(|w| w.id == waiter_id) {
            self.waiters.remove(pos);
        }
    }

    /// Give a resource or a free slot to the longest waiting caller.
    ///
    /// With nobody waiting, resources go to the idle store and slots are
    /// uncounted.
    fn dispatch(&mut self, mut handoff: Handoff<T>) {
        while let Some(waiter) = self.waiters.pop_front() {
            match waiter.deliver(handoff) {
                Ok(()) => return,
                Err(returned) => handoff = returned,
            }
        }

        match handoff {
            Handoff::Resource(entry) => self.idle.push_back(entry),
            Handoff::Slot => self.created -= 1,
        }
    }
}

/// State shared between a pool, its clones and the leases it hands out
struct PoolShared<T> {
    state: Mutex<PoolState<T>>,
    factory: FactoryFn<T>,
    reset: Option<ResetFn<T>>,
    capacity: usize,
    idle_order: IdleOrder,
    name: String,
    leases: DashMap<usize, Instant>,
    next_id: AtomicUsize,
    metrics: MetricsTracker,
}

/// Frees a counted slot unless committed, including when a hook panics
struct SlotReservation<'a, T> {
    shared: &'a PoolShared<T>,
    armed: bool,
}

impl<T> SlotReservation<'_, T> {
    fn commit(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for SlotReservation<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.free_slot();
        }
    }
}

impl<T> PoolShared<T> {
    /// Run the factory for a slot the caller has already counted
    fn build(&self) -> PoolResult<IdleEntry<T>> {
        let reservation = SlotReservation {
            shared: self,
            armed: true,
        };

        match (self.factory)() {
            Ok(value) => {
                reservation.commit();
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                self.metrics.total_created.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(pool = %self.name, resource_id = id, "resource created");
                Ok(IdleEntry { value, id })
            }
            Err(err) => {
                drop(reservation);
                self.metrics.factory_failures.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(pool = %self.name, error = %err, "resource factory failed");
                Err(PoolError::factory(err))
            }
        }
    }

    fn free_slot(&self) {
        self.state.lock().dispatch(Handoff::Slot);
    }

    /// Return a leased resource, resetting it first if a hook is configured
    fn restore(&self, mut value: T, id: usize) -> PoolResult<()> {
        self.leases.remove(&id);
        let reservation = SlotReservation {
            shared: self,
            armed: true,
        };

        if let Some(reset) = &self.reset
            && let Err(err) = reset(&mut value)
        {
            drop(value);
            drop(reservation);
            self.metrics.reset_failures.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(pool = %self.name, resource_id = id, error = %err, "resource discarded after failed reset");
            return Err(PoolError::reset(err));
        }

        reservation.commit();
        self.state.lock().dispatch(Handoff::Resource(IdleEntry { value, id }));
        self.metrics.total_released.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(pool = %self.name, resource_id = id, "resource returned");
        Ok(())
    }

    fn lease(self: &Arc<Self>, entry: IdleEntry<T>) -> PooledObject<T> {
        self.leases.insert(entry.id, Instant::now());
        self.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(pool = %self.name, resource_id = entry.id, "resource leased");
        PooledObject {
            value: Some(entry.value),
            id: entry.id,
            pool: Arc::clone(self),
        }
    }

    fn accept(self: &Arc<Self>, handoff: Handoff<T>) -> PoolResult<PooledObject<T>> {
        match handoff {
            Handoff::Resource(entry) => Ok(self.lease(entry)),
            Handoff::Slot => {
                let entry = self.build()?;
                Ok(self.lease(entry))
            }
        }
    }
}

/// A leased resource that goes back to its pool when dropped
///
/// Dropping the guard is equivalent to [`PooledObject::release`] except that
/// a reset failure cannot be reported to anyone; it is logged at `warn`
/// level and the resource is discarded.
pub struct PooledObject<T> {
    value: Option<T>,
    id: usize,
    pool: Arc<PoolShared<T>>,
}

impl<T> PooledObject<T> {
    /// Pool-assigned id of the underlying resource
    ///
    /// Ids are unique within one pool, so two leases with the same id
    /// hold the same resource instance.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Return the resource to its pool, reporting reset failures
    pub fn release(mut self) -> PoolResult<()> {
        match self.value.take() {
            Some(value) => self.pool.restore(value, self.id),
            None => Ok(()),
        }
    }

    /// Take the resource out of circulation
    ///
    /// Its capacity slot is freed, so the pool may create a replacement.
    pub fn detach(mut self) -> T {
        let value = self.value.take().expect("Value already taken");
        self.pool.leases.remove(&self.id);
        self.pool.free_slot();
        tracing::debug!(pool = %self.pool.name, resource_id = self.id, "resource detached");
        value
    }
}

impl<T> Deref for PooledObject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value.as_ref().expect("Value already taken")
    }
}

impl<T> DerefMut for PooledObject<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.value.as_mut().expect("Value already taken")
    }
}

impl<T> Drop for PooledObject<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take()
            && let Err(err) = self.pool.restore(value, self.id)
        {
            tracing::warn!(
                pool = %self.pool.name,
                resource_id = self.id,
                error = %err,
                "dropped lease could not be returned"
            );
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PooledObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledObject")
            .field("id", &self.id)
            .field("value", &self.value)
            .finish()
    }
}

/// Waiting side of an async acquire.
///
/// Dropping it before a handoff arrives withdraws from the waiter queue and
/// puts back anything that was delivered in the meantime.
struct AsyncWait<'a, T> {
    shared: &'a PoolShared<T>,
    waiter_id: u64,
    rx: Option<oneshot::Receiver<Handoff<T>>>,
}

impl<T> AsyncWait<'_, T> {
    async fn recv(&mut self) -> PoolResult<Handoff<T>> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(PoolError::Cancelled);
        };
        let result = rx.await;
        self.rx = None;
        result.map_err(|_| PoolError::Cancelled)
    }
}

impl<T> Drop for AsyncWait<'_, T> {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            let mut state = self.shared.state.lock();
            state.withdraw(self.waiter_id);
            if let Ok(handoff) = rx.try_recv() {
                state.dispatch(handoff);
            }
        }
    }
}

/// Bounded, thread-safe pool that creates resources lazily
///
/// At most `max_pool_size` resources exist at once. When all of them are
/// leased, [`acquire`](Self::acquire) blocks until one is returned; blocked
/// callers are served in arrival order. Cloning the pool yields another
/// handle to the same resources.
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{PoolConfiguration, ResourcePool};
///
/// let config = PoolConfiguration::new()
///     .with_max_pool_size(1)
///     .with_factory(String::new)
///     .with_reset(|s: &mut String| s.clear());
/// let pool = ResourcePool::new(config).unwrap();
///
/// let mut buf = pool.acquire().unwrap();
/// buf.push_str("scratch");
/// let first = buf.id();
/// pool.release(buf).unwrap();
///
/// let buf = pool.acquire().unwrap();
/// assert_eq!(buf.id(), first);
/// assert!(buf.is_empty());
/// ```
pub struct ResourcePool<T> {
    shared: Arc<PoolShared<T>>,
}

impl<T> Clone for ResourcePool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for ResourcePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ResourcePool")
            .field("name", &self.shared.name)
            .field("capacity", &self.shared.capacity)
            .field("created", &state.created)
            .field("idle", &state.idle.len())
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

impl<T: Send + 'static> ResourcePool<T> {
    /// Create a new pool from a configuration
    ///
    /// Fails with [`PoolError::InvalidConfiguration`] for a zero capacity or
    /// a missing factory, and with [`PoolError::FactoryFailed`] if warm-up
    /// cannot create its resources.
    pub fn new(config: PoolConfiguration<T>) -> PoolResult<Self> {
        config.validate()?;

        let PoolConfiguration {
            max_pool_size,
            warmup_size,
            idle_order,
            name,
            factory,
            reset,
        } = config;

        let factory = factory.ok_or_else(|| {
            PoolError::InvalidConfiguration("a resource factory is required".to_string())
        })?;

        let pool = Self {
            shared: Arc::new(PoolShared {
                state: Mutex::new(PoolState::new(max_pool_size)),
                factory,
                reset,
                capacity: max_pool_size,
                idle_order,
                name,
                leases: DashMap::new(),
                next_id: AtomicUsize::new(0),
                metrics: MetricsTracker::new(),
            }),
        };

        if let Some(count) = warmup_size {
            pool.warmup(count)?;
        }

        tracing::debug!(pool = %pool.shared.name, capacity = max_pool_size, "resource pool created");
        Ok(pool)
    }

    /// Create a pool with the given capacity and factory and no reset hook
    pub fn with_factory<F>(capacity: usize, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(
            PoolConfiguration::new()
                .with_max_pool_size(capacity)
                .with_factory(factory),
        )
    }

    /// Get a resource, blocking until one is available
    pub fn acquire(&self) -> PoolResult<PooledObject<T>> {
        self.checkout(None)
    }

    /// Get a resource, blocking for at most `timeout`
    ///
    /// On [`PoolError::Timeout`] nothing was created or claimed.
    pub fn acquire_timeout(&self, timeout: Duration) -> PoolResult<PooledObject<T>> {
        self.checkout(Some(timeout))
    }

    /// Get a resource without blocking
    ///
    /// Returns [`PoolError::PoolEmpty`] when the call would have to wait.
    pub fn try_acquire(&self) -> PoolResult<PooledObject<T>> {
        let claim = self.claim();
        match claim {
            Claim::Idle(entry) => Ok(self.shared.lease(entry)),
            Claim::Slot => self.shared.accept(Handoff::Slot),
            Claim::Exhausted => {
                self.shared.metrics.pool_empty_events.fetch_add(1, Ordering::Relaxed);
                Err(PoolError::PoolEmpty)
            }
        }
    }

    /// Get a resource asynchronously, waiting as long as it takes
    ///
    /// Dropping the returned future while it waits withdraws the request
    /// without losing any resource handed to it. A factory call on the
    /// creation path runs inline on the current task.
    pub async fn acquire_async(&self) -> PoolResult<PooledObject<T>> {
        let (waiter_id, rx) = {
            let mut state = self.shared.state.lock();
            match state.claim(self.shared.capacity, self.shared.idle_order) {
                Claim::Idle(entry) => {
                    drop(state);
                    return Ok(self.shared.lease(entry));
                }
                Claim::Slot => {
                    drop(state);
                    return self.shared.accept(Handoff::Slot);
                }
                Claim::Exhausted => {}
            }

            let (tx, rx) = oneshot::channel();
            (state.enqueue(WaiterTx::Async(tx)), rx)
        };

        self.shared.metrics.wait_events.fetch_add(1, Ordering::Relaxed);
        let mut wait = AsyncWait {
            shared: &self.shared,
            waiter_id,
            rx: Some(rx),
        };
        let handoff = wait.recv().await?;
        self.shared.accept(handoff)
    }

    /// Get a resource asynchronously, waiting for at most `timeout`
    pub async fn acquire_timeout_async(&self, timeout: Duration) -> PoolResult<PooledObject<T>> {
        match tokio::time::timeout(timeout, self.acquire_async()).await {
            Ok(result) => result,
            Err(_) => {
                self.shared.metrics.timeouts.fetch_add(1, Ordering::Relaxed);
                Err(PoolError::Timeout(timeout))
            }
        }
    }

    /// Return a leased resource to this pool
    ///
    /// Applies the reset hook first. If it fails the resource is dropped,
    /// its slot is freed and [`PoolError::ResetFailed`] is returned. A lease
    /// from another pool is rejected with [`PoolError::ForeignResource`] and
    /// goes back to the pool it came from.
    pub fn release(&self, object: PooledObject<T>) -> PoolResult<()> {
        if !Arc::ptr_eq(&self.shared, &object.pool) {
            return Err(PoolError::ForeignResource);
        }
        object.release()
    }

    /// Pre-create up to `count` idle resources, returning how many were made
    ///
    /// Stops early once the pool is at capacity.
    pub fn warmup(&self, count: usize) -> PoolResult<usize> {
        let mut created = 0;
        for _ in 0..count {
            {
                let mut state = self.shared.state.lock();
                if state.created >= self.shared.capacity {
                    break;
                }
                state.created += 1;
            }

            let entry = self.shared.build()?;
            self.shared.state.lock().dispatch(Handoff::Resource(entry));
            created += 1;
        }

        tracing::debug!(pool = %self.shared.name, created, "pool warmed up");
        Ok(created)
    }

    /// Warm up on the blocking thread pool
    pub async fn warmup_async(&self, count: usize) -> PoolResult<usize> {
        let pool = self.clone();
        tokio::task::spawn_blocking(move || pool.warmup(count))
            .await
            .map_err(|_| PoolError::Cancelled)?
    }

    fn claim(&self) -> Claim<T> {
        self.shared
            .state
            .lock()
            .claim(self.shared.capacity, self.shared.idle_order)
    }

    fn checkout(&self, timeout: Option<Duration>) -> PoolResult<PooledObject<T>> {
        let mut state = self.shared.state.lock();
        match state.claim(self.shared.capacity, self.shared.idle_order) {
            Claim::Idle(entry) => {
                drop(state);
                return Ok(self.shared.lease(entry));
            }
            Claim::Slot => {
                drop(state);
                return self.shared.accept(Handoff::Slot);
            }
            Claim::Exhausted => {}
        }

        let (tx, rx) = channel::bounded(1);
        let waiter_id = state.enqueue(WaiterTx::Blocking(tx));
        drop(state);

        self.shared.metrics.wait_events.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(pool = %self.shared.name, waiter_id, "waiting for a resource");

        let received = match timeout {
            Some(timeout) => rx.recv_timeout(timeout),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(handoff) => self.shared.accept(handoff),
            Err(_) => {
                self.shared.state.lock().withdraw(waiter_id);

                // A release can land between the deadline and the withdrawal
                if let Ok(handoff) = rx.try_recv() {
                    return self.shared.accept(handoff);
                }

                match timeout {
                    Some(timeout) => {
                        self.shared.metrics.timeouts.fetch_add(1, Ordering::Relaxed);
                        Err(PoolError::Timeout(timeout))
                    }
                    None => Err(PoolError::Cancelled),
                }
            }
        }
    }
}

impl<T> ResourcePool<T> {
    /// Maximum number of resources in circulation
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Pool name from the configuration
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Resources currently idle in the pool
    pub fn idle_count(&self) -> usize {
        self.shared.state.lock().idle.len()
    }

    /// Resources currently leased, including ones being created
    pub fn active_count(&self) -> usize {
        let state = self.shared.state.lock();
        state.created - state.idle.len()
    }

    /// Resources in circulation, idle or leased
    pub fn created_count(&self) -> usize {
        self.shared.state.lock().created
    }

    /// Callers currently blocked waiting for a resource
    pub fn waiter_count(&self) -> usize {
        self.shared.state.lock().waiters.len()
    }

    /// Get health status
    pub fn health_status(&self) -> HealthStatus {
        let gauges = self.gauges();
        HealthStatus::new(gauges.idle, gauges.active, gauges.capacity, gauges.waiters)
    }

    /// Get pool metrics
    pub fn metrics(&self) -> PoolMetrics {
        self.shared.metrics.get_metrics(self.gauges())
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.metrics().export()
    }

    /// Export metrics in Prometheus format, labelled with the pool name
    #[cfg(feature = "metrics")]
    pub fn export_metrics_prometheus(
        &self,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        crate::metrics::MetricsExporter::export_prometheus(&self.metrics(), &self.shared.name, tags)
    }

    fn gauges(&self) -> PoolGauges {
        let (idle, created, waiters) = {
            let state = self.shared.state.lock();
            (state.idle.len(), state.created, state.waiters.len())
        };
        let oldest_lease = self
            .shared
            .leases
            .iter()
            .map(|lease| lease.value().elapsed())
            .max();

        PoolGauges {
            active: created - idle,
            idle,
            created,
            waiters,
            capacity: self.shared.capacity,
            oldest_lease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn counting_pool(capacity: usize) -> (ResourcePool<usize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pool = ResourcePool::with_factory(capacity, move || {
            counter.fetch_add(1, Ordering::SeqCst)
        })
        .unwrap();
        (pool, calls)
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = ResourcePool::with_factory(0, || 1u8);
        assert!(matches!(result, Err(PoolError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_creates_lazily() {
        let (pool, calls) = counting_pool(3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(pool.created_count(), 0);

        let obj = pool.acquire().unwrap();
        assert_eq!(*obj, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_drop_returns_to_pool() {
        let (pool, _) = counting_pool(2);

        {
            let _obj = pool.acquire().unwrap();
        }

        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_try_acquire_reports_empty() {
        let (pool, _) = counting_pool(1);

        let held = pool.try_acquire().unwrap();
        assert!(matches!(pool.try_acquire(), Err(PoolError::PoolEmpty)));

        drop(held);
        assert!(pool.try_acquire().is_ok());
        assert_eq!(pool.metrics().pool_empty_events, 1);
    }

    #[test]
    fn test_lifo_and_fifo_idle_order() {
        let make = |order| {
            ResourcePool::new(
                PoolConfiguration::new()
                    .with_max_pool_size(2)
                    .with_warmup(2)
                    .with_idle_order(order)
                    .with_factory(|| ()),
            )
            .unwrap()
        };

        let lifo = make(IdleOrder::Lifo);
        assert_eq!(lifo.acquire().unwrap().id(), 1);

        let fifo = make(IdleOrder::Fifo);
        assert_eq!(fifo.acquire().unwrap().id(), 0);
    }

    #[test]
    fn test_release_into_other_pool_is_rejected() {
        let (a, _) = counting_pool(1);
        let (b, _) = counting_pool(1);

        let obj = a.acquire().unwrap();
        assert!(matches!(b.release(obj), Err(PoolError::ForeignResource)));

        // The rejected lease went home to `a`
        assert_eq!(a.idle_count(), 1);
        assert_eq!(b.idle_count(), 0);
    }

    #[test]
    fn test_detach_frees_slot() {
        let (pool, calls) = counting_pool(1);

        let value = pool.acquire().unwrap().detach();
        assert_eq!(value, 0);
        assert_eq!(pool.created_count(), 0);

        let replacement = pool.acquire().unwrap();
        assert_eq!(*replacement, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_detach_wakes_waiter() {
        let (pool, _) = counting_pool(1);
        let held = pool.acquire().unwrap();

        let waiter = {
            let pool = pool.clone();
            thread::spawn(move || *pool.acquire().unwrap())
        };

        while pool.waiter_count() == 0 {
            thread::yield_now();
        }
        drop(held.detach());

        assert_eq!(waiter.join().unwrap(), 1);
    }

    #[test]
    fn test_factory_panic_frees_slot() {
        let fail = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&fail);
        let pool = ResourcePool::with_factory(1, move || {
            if flag.swap(false, Ordering::SeqCst) {
                panic!("first creation blows up");
            }
            5u32
        })
        .unwrap();

        let attempt = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| pool.acquire()));
        assert!(attempt.is_err());
        assert_eq!(pool.created_count(), 0);

        assert_eq!(*pool.acquire().unwrap(), 5);
    }

    #[test]
    fn test_debug_output() {
        let (pool, _) = counting_pool(4);
        let obj = pool.acquire().unwrap();

        assert!(format!("{pool:?}").contains("capacity: 4"));
        assert!(format!("{obj:?}").contains("value: 0"));
    }

    #[tokio::test]
    async fn test_async_acquire() {
        let (pool, _) = counting_pool(1);

        let obj = pool.acquire_async().await.unwrap();
        assert_eq!(*obj, 0);
    }

    #[tokio::test]
    async fn test_async_waiter_receives_release() {
        let (pool, calls) = counting_pool(1);
        let held = pool.acquire_async().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_async().await.map(|obj| obj.id()) })
        };

        while pool.waiter_count() == 0 {
            tokio::task::yield_now().await;
        }
        drop(held);

        assert_eq!(waiter.await.unwrap().unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_timeout_withdraws() {
        let (pool, _) = counting_pool(1);
        let held = pool.acquire_async().await.unwrap();

        let result = pool.acquire_timeout_async(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(PoolError::Timeout(_))));
        assert_eq!(pool.waiter_count(), 0);

        drop(held);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_warmup_async() {
        let (pool, calls) = counting_pool(3);

        assert_eq!(pool.warmup_async(5).await.unwrap(), 3);
        assert_eq!(pool.idle_count(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
