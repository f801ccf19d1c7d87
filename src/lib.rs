//! # EsoxSolutions.ResourcePool
//!
//! Bounded, thread-safe resource pool for amortizing the cost of expensive
//! resources (formatters, buffers, parsers) across many short borrow/return
//! cycles.
//!
//! ## Features
//!
//! - Fixed capacity with lazy, on-demand creation through a factory
//! - Blocking acquire with first-come first-served wakeup, plus timed,
//!   non-blocking and async variants
//! - Optional reset hook applied before a resource becomes idle again
//! - Automatic return of resources via RAII (Drop trait)
//! - Failed creations and failed resets never leak capacity
//! - Pool warm-up/pre-population
//! - Health monitoring and metrics
//! - Prometheus metrics export
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_resourcepool::{PoolConfiguration, ResourcePool};
//!
//! let config = PoolConfiguration::new()
//!     .with_max_pool_size(2)
//!     .with_factory(|| vec![0u8; 4096])
//!     .with_reset(|buf: &mut Vec<u8>| buf.fill(0));
//! let pool = ResourcePool::new(config).unwrap();
//!
//! {
//!     let mut buf = pool.acquire().unwrap();
//!     buf[0] = 42;
//!     // Buffer is zeroed and returned when `buf` goes out of scope
//! }
//!
//! assert_eq!(pool.acquire().unwrap()[0], 0);
//! ```

mod pool;
mod config;
mod metrics;
mod health;
mod errors;

pub use pool::{ResourcePool, PooledObject};
pub use config::{IdleOrder, PoolConfiguration};
pub use metrics::PoolMetrics;
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use health::HealthStatus;
pub use errors::{BoxError, PoolError, PoolResult, SharedError};
