//! Metrics collection and export for resource pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use esox_resourcepool::ResourcePool;
///
/// let pool = ResourcePool::with_factory(3, || vec![0u8; 64]).unwrap();
///
/// {
///     let _buf = pool.acquire().unwrap();
///     let metrics = pool.metrics();
///     assert_eq!(metrics.total_acquired, 1);
///     assert_eq!(metrics.total_created, 1);
///     assert_eq!(metrics.active_resources, 1);
/// }
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Total resources handed out
    pub total_acquired: usize,

    /// Total resources returned to the pool
    pub total_released: usize,

    /// Total successful factory calls
    pub total_created: usize,

    /// Factory calls that returned an error
    pub factory_failures: usize,

    /// Resources discarded because the reset hook failed
    pub reset_failures: usize,

    /// Acquires that had to wait for a resource
    pub wait_events: usize,

    /// Timed acquires that gave up
    pub timeouts: usize,

    /// Non-blocking acquires that found the pool exhausted
    pub pool_empty_events: usize,

    /// Current leased resources
    pub active_resources: usize,

    /// Current idle resources
    pub idle_resources: usize,

    /// Resources in circulation, idle or leased
    pub created_resources: usize,

    /// Callers currently waiting
    pub waiters: usize,

    /// Age of the longest outstanding lease
    pub oldest_lease: Option<Duration>,

    /// Pool utilization ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Maximum pool capacity
    pub max_capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("factory_failures".to_string(), self.factory_failures.to_string());
        metrics.insert("reset_failures".to_string(), self.reset_failures.to_string());
        metrics.insert("wait_events".to_string(), self.wait_events.to_string());
        metrics.insert("timeouts".to_string(), self.timeouts.to_string());
        metrics.insert("pool_empty_events".to_string(), self.pool_empty_events.to_string());
        metrics.insert("active_resources".to_string(), self.active_resources.to_string());
        metrics.insert("idle_resources".to_string(), self.idle_resources.to_string());
        metrics.insert("created_resources".to_string(), self.created_resources.to_string());
        metrics.insert("waiters".to_string(), self.waiters.to_string());
        metrics.insert(
            "oldest_lease_ms".to_string(),
            self.oldest_lease
                .map(|age| age.as_millis().to_string())
                .unwrap_or_else(|| "0".to_string()),
        );
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("max_capacity".to_string(), self.max_capacity.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// Every series carries a `pool` label plus any extra `tags`.
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_resourcepool::{PoolConfiguration, ResourcePool};
    /// use std::collections::HashMap;
    ///
    /// let config = PoolConfiguration::new()
    ///     .with_name("formatters")
    ///     .with_factory(String::new);
    /// let pool = ResourcePool::new(config).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = pool.export_metrics_prometheus(Some(&tags)).unwrap();
    /// assert!(output.contains("resourcepool_resources_active"));
    /// assert!(output.contains("pool=\"formatters\""));
    /// assert!(output.contains("service=\"api\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> crate::PoolResult<String> {
        Self::render(metrics, pool_name, tags)
            .map_err(|e| crate::PoolError::MetricsExport(e.to_string()))
    }

    fn render(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> prometheus::Result<String> {
        use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};

        let mut labels = tags.cloned().unwrap_or_default();
        labels.insert("pool".to_string(), pool_name.to_string());
        let registry = Registry::new_custom(None, Some(labels))?;

        // Gauge metrics
        let gauges = [
            ("resourcepool_resources_active", "Current leased resources", metrics.active_resources),
            ("resourcepool_resources_idle", "Current idle resources", metrics.idle_resources),
            ("resourcepool_resources_created", "Resources in circulation", metrics.created_resources),
            ("resourcepool_waiters", "Callers waiting for a resource", metrics.waiters),
            ("resourcepool_capacity", "Maximum pool capacity", metrics.max_capacity),
        ];
        for (name, help, value) in gauges {
            let gauge = IntGauge::with_opts(Opts::new(name, help))?;
            gauge.set(value as i64);
            registry.register(Box::new(gauge))?;
        }

        let utilization = Gauge::with_opts(Opts::new(
            "resourcepool_utilization",
            "Pool utilization ratio",
        ))?;
        utilization.set(metrics.utilization);
        registry.register(Box::new(utilization))?;

        // Counter metrics
        let counters = [
            ("resourcepool_acquired_total", "Total resources acquired", metrics.total_acquired),
            ("resourcepool_released_total", "Total resources released", metrics.total_released),
            ("resourcepool_created_total", "Total resources created", metrics.total_created),
            ("resourcepool_factory_failures_total", "Factory failures", metrics.factory_failures),
            ("resourcepool_reset_failures_total", "Reset hook failures", metrics.reset_failures),
            ("resourcepool_wait_events_total", "Acquires that had to wait", metrics.wait_events),
            ("resourcepool_timeouts_total", "Acquires that timed out", metrics.timeouts),
            ("resourcepool_empty_events_total", "Non-blocking acquires on an exhausted pool", metrics.pool_empty_events),
        ];
        for (name, help, value) in counters {
            let counter = IntCounter::with_opts(Opts::new(name, help))?;
            counter.inc_by(value as u64);
            registry.register(Box::new(counter))?;
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Point-in-time view of the pool state used to build [`PoolMetrics`]
pub(crate) struct PoolGauges {
    pub active: usize,
    pub idle: usize,
    pub created: usize,
    pub waiters: usize,
    pub capacity: usize,
    pub oldest_lease: Option<Duration>,
}

/// Internal metrics tracker
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicUsize,
    pub total_released: AtomicUsize,
    pub total_created: AtomicUsize,
    pub factory_failures: AtomicUsize,
    pub reset_failures: AtomicUsize,
    pub wait_events: AtomicUsize,
    pub timeouts: AtomicUsize,
    pub pool_empty_events: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            total_acquired: AtomicUsize::new(0),
            total_released: AtomicUsize::new(0),
            total_created: AtomicUsize::new(0),
            factory_failures: AtomicUsize::new(0),
            reset_failures: AtomicUsize::new(0),
            wait_events: AtomicUsize::new(0),
            timeouts: AtomicUsize::new(0),
            pool_empty_events: AtomicUsize::new(0),
        }
    }

    pub fn get_metrics(&self, gauges: PoolGauges) -> PoolMetrics {
        let utilization = if gauges.capacity > 0 {
            gauges.active as f64 / gauges.capacity as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            total_created: self.total_created.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            reset_failures: self.reset_failures.load(Ordering::Relaxed),
            wait_events: self.wait_events.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            pool_empty_events: self.pool_empty_events.load(Ordering::Relaxed),
            active_resources: gauges.active,
            idle_resources: gauges.idle,
            created_resources: gauges.created,
            waiters: gauges.waiters,
            oldest_lease: gauges.oldest_lease,
            utilization,
            max_capacity: gauges.capacity,
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}
