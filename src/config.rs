//! Pool configuration options

use std::fmt;
use std::sync::Arc;

use crate::errors::{BoxError, PoolError, PoolResult};

pub(crate) type FactoryFn<T> = Arc<dyn Fn() -> Result<T, BoxError> + Send + Sync>;
pub(crate) type ResetFn<T> = Arc<dyn Fn(&mut T) -> Result<(), BoxError> + Send + Sync>;

/// Order in which idle resources are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleOrder {
    /// Most recently returned resource first
    #[default]
    Lifo,

    /// Least recently returned resource first
    Fifo,
}

/// Configuration for resource pool behavior
///
/// # Examples
///
/// ```
/// use esox_resourcepool::{IdleOrder, PoolConfiguration};
///
/// let config = PoolConfiguration::new()
///     .with_max_pool_size(4)
///     .with_factory(|| vec![0u8; 1024])
///     .with_reset(|buf: &mut Vec<u8>| buf.fill(0))
///     .with_idle_order(IdleOrder::Fifo);
///
/// assert_eq!(config.max_pool_size, 4);
/// assert!(config.has_reset());
/// assert!(config.validate().is_ok());
/// ```
pub struct PoolConfiguration<T> {
    /// Maximum number of resources the pool will ever have in circulation
    pub max_pool_size: usize,

    /// Number of resources created eagerly when the pool is built
    pub warmup_size: Option<usize>,

    /// Order in which idle resources are handed out
    pub idle_order: IdleOrder,

    /// Name used in log fields and metric labels
    pub name: String,

    pub(crate) factory: Option<FactoryFn<T>>,
    pub(crate) reset: Option<ResetFn<T>>,
}

impl<T> Default for PoolConfiguration<T> {
    fn default() -> Self {
        Self {
            max_pool_size: 10,
            warmup_size: None,
            idle_order: IdleOrder::default(),
            name: "default".to_string(),
            factory: None,
            reset: None,
        }
    }
}

impl<T> Clone for PoolConfiguration<T> {
    fn clone(&self) -> Self {
        Self {
            max_pool_size: self.max_pool_size,
            warmup_size: self.warmup_size,
            idle_order: self.idle_order,
            name: self.name.clone(),
            factory: self.factory.clone(),
            reset: self.reset.clone(),
        }
    }
}

impl<T> fmt::Debug for PoolConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("max_pool_size", &self.max_pool_size)
            .field("warmup_size", &self.warmup_size)
            .field("idle_order", &self.idle_order)
            .field("name", &self.name)
            .field("has_factory", &self.factory.is_some())
            .field("has_reset", &self.reset.is_some())
            .finish()
    }
}

impl<T> PoolConfiguration<T> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum pool size
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_resourcepool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::<String>::new()
    ///     .with_max_pool_size(50);
    ///
    /// assert_eq!(config.max_pool_size, 50);
    /// ```
    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Set an infallible factory used to create resources on demand
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        T: 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move || -> Result<T, BoxError> { Ok(factory()) }));
        self
    }

    /// Set a factory that may fail
    ///
    /// A failed creation does not consume a capacity slot; the error is
    /// returned to whoever asked for the resource.
    pub fn with_fallible_factory<F, E>(mut self, factory: F) -> Self
    where
        T: 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.factory = Some(Arc::new(move || -> Result<T, BoxError> {
            factory().map_err(Into::into)
        }));
        self
    }

    /// Set a hook applied to every resource before it becomes idle again
    pub fn with_reset<F>(mut self, reset: F) -> Self
    where
        T: 'static,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.reset = Some(Arc::new(move |value: &mut T| -> Result<(), BoxError> {
            reset(value);
            Ok(())
        }));
        self
    }

    /// Set a reset hook that may fail
    ///
    /// A resource whose reset fails is discarded and its slot freed.
    pub fn with_fallible_reset<F, E>(mut self, reset: F) -> Self
    where
        T: 'static,
        F: Fn(&mut T) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.reset = Some(Arc::new(move |value: &mut T| -> Result<(), BoxError> {
            reset(value).map_err(Into::into)
        }));
        self
    }

    /// Set warm-up size
    pub fn with_warmup(mut self, size: usize) -> Self {
        self.warmup_size = Some(size);
        self
    }

    /// Set the order idle resources are handed out in
    pub fn with_idle_order(mut self, order: IdleOrder) -> Self {
        self.idle_order = order;
        self
    }

    /// Set the pool name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether a reset hook is configured
    pub fn has_reset(&self) -> bool {
        self.reset.is_some()
    }

    /// Check the configuration, returning the first problem found
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_resourcepool::{PoolConfiguration, PoolError};
    ///
    /// let config = PoolConfiguration::new()
    ///     .with_max_pool_size(0)
    ///     .with_factory(|| 1u32);
    ///
    /// assert!(matches!(config.validate(), Err(PoolError::InvalidConfiguration(_))));
    /// ```
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_pool_size == 0 {
            return Err(PoolError::InvalidConfiguration(
                "max_pool_size must be at least 1".to_string(),
            ));
        }

        if self.factory.is_none() {
            return Err(PoolError::InvalidConfiguration(
                "a resource factory is required".to_string(),
            ));
        }

        if let Some(warmup) = self.warmup_size
            && warmup > self.max_pool_size
        {
            return Err(PoolError::InvalidConfiguration(format!(
                "warmup_size {} exceeds max_pool_size {}",
                warmup, self.max_pool_size
            )));
        }

        Ok(())
    }
}
