//! Health monitoring for resource pools

/// Health status of a resource pool
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{PoolConfiguration, ResourcePool};
///
/// let config = PoolConfiguration::new()
///     .with_max_pool_size(3)
///     .with_warmup(3)
///     .with_factory(|| 0u64);
/// let pool = ResourcePool::new(config).unwrap();
///
/// let health = pool.health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.idle_resources, 3);
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Current pool utilization (0.0 to 1.0)
    pub utilization: f64,

    /// Idle resources count
    pub idle_resources: usize,

    /// Leased resources count
    pub active_resources: usize,

    /// Callers blocked waiting for a resource
    pub waiters: usize,

    /// Total capacity
    pub total_capacity: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(idle: usize, active: usize, capacity: usize, waiters: usize) -> Self {
        let utilization = if capacity > 0 {
            active as f64 / capacity as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        // Check for high utilization
        if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        // Callers queueing means capacity is the bottleneck
        if waiters > 0 {
            warnings.push(format!("{} caller(s) waiting for a resource", waiters));
            is_healthy = false;
        }

        if idle == 0 && active >= capacity && capacity > 0 {
            warnings.push("Pool is exhausted".to_string());
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            idle_resources: idle,
            active_resources: active,
            waiters,
            total_capacity: capacity,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_pool_is_healthy() {
        let health = HealthStatus::new(0, 0, 4, 0);
        assert!(health.is_healthy());
        assert_eq!(health.warning_count, 0);
    }

    #[test]
    fn test_waiters_make_pool_unhealthy() {
        let health = HealthStatus::new(0, 2, 2, 3);

        assert!(!health.is_healthy());
        assert_eq!(health.warning_count, 3);
        assert!(health.warnings.iter().any(|w| w.contains("3 caller(s)")));
    }
}
