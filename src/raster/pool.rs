//! Bounded pool of rendering engine instances.
//!
//! The pool hands out [`InstanceLease`]s. A lease owns one instance and one
//! permit of the pool's semaphore; dropping the lease returns both, so an
//! instance is released exactly once on every exit path.
//!
//! # Sizing
//!
//! - `max_total`: upper bound on concurrently checked-out instances
//! - `max_idle`: released instances beyond this count are closed instead of kept
//! - `min_idle`: instances created eagerly when the pool starts
//!
//! # Example
//!
//! ```ignore
//! let pool = InstancePool::new(factory, PoolConfig::default())?;
//!
//! let mut lease = pool.acquire().await?;
//! let document = lease.open_document(&bytes)?;
//! // document and lease are released when they go out of scope
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::error::PoolError;

use super::engine::InstanceFactory;

/// Default number of instances created at startup.
pub const DEFAULT_MIN_IDLE: usize = 1;

/// Default number of released instances kept for reuse.
pub const DEFAULT_MAX_IDLE: usize = 3;

/// Default maximum number of instances checked out at once.
pub const DEFAULT_MAX_TOTAL: usize = 10;

/// Default time to wait for a free instance.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// Sizing and timeout knobs for [`InstancePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub min_idle: usize,
    pub max_idle: usize,
    pub max_total: usize,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_idle: DEFAULT_MIN_IDLE,
            max_idle: DEFAULT_MAX_IDLE,
            max_total: DEFAULT_MAX_TOTAL,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl PoolConfig {
    pub fn with_min_idle(mut self, min_idle: usize) -> Self {
        self.min_idle = min_idle;
        self
    }

    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn with_max_total(mut self, max_total: usize) -> Self {
        self.max_total = max_total;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Check that the bounds are consistent.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_total == 0 {
            return Err(PoolError::InvalidConfig(
                "max_total must be greater than 0".to_string(),
            ));
        }
        if self.max_idle > self.max_total {
            return Err(PoolError::InvalidConfig(format!(
                "max_idle ({}) must not exceed max_total ({})",
                self.max_idle, self.max_total
            )));
        }
        if self.min_idle > self.max_idle {
            return Err(PoolError::InvalidConfig(format!(
                "min_idle ({}) must not exceed max_idle ({})",
                self.min_idle, self.max_idle
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(PoolError::InvalidConfig(
                "acquire_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances waiting for reuse
    pub idle: usize,

    /// Instances currently checked out
    pub in_use: usize,

    /// Maximum instances that may be checked out at once
    pub max_total: usize,
}

// =============================================================================
// Pool
// =============================================================================

struct Shared<F: InstanceFactory> {
    factory: F,
    config: PoolConfig,
    idle: Mutex<Vec<F::Instance>>,
    permits: Arc<Semaphore>,
    closed: AtomicBool,
}

impl<F: InstanceFactory> Shared<F> {
    fn idle(&self) -> MutexGuard<'_, Vec<F::Instance>> {
        // The idle list stays consistent even if a holder panicked.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, instance: F::Instance) {
        // `closed` is only set while the idle lock is held
        let mut idle = self.idle();
        if self.closed.load(Ordering::Acquire) {
            debug!("Pool closed, dropping released instance");
            return;
        }

        if idle.len() < self.config.max_idle {
            idle.push(instance);
        } else {
            debug!(
                max_idle = self.config.max_idle,
                "Idle limit reached, closing released instance"
            );
        }
    }
}

/// A bounded, thread-safe pool of rendering instances.
///
/// Cloning the pool is cheap and yields a handle to the same instances.
pub struct InstancePool<F: InstanceFactory> {
    shared: Arc<Shared<F>>,
}

impl<F: InstanceFactory> Clone for InstancePool<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: InstanceFactory> InstancePool<F> {
    /// Create a pool and eagerly start `min_idle` instances.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or a warm-up instance cannot be
    /// created.
    pub fn new(factory: F, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let mut idle = Vec::with_capacity(config.max_idle);
        for _ in 0..config.min_idle {
            idle.push(factory.create()?);
        }

        debug!(
            min_idle = config.min_idle,
            max_idle = config.max_idle,
            max_total = config.max_total,
            "Rendering pool initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                factory,
                config,
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(config.max_total)),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Check out an instance, waiting up to the configured timeout.
    pub async fn acquire(&self) -> Result<InstanceLease<F>, PoolError> {
        self.acquire_timeout(self.shared.config.acquire_timeout)
            .await
    }

    /// Check out an instance, waiting up to `timeout`.
    ///
    /// Reuses an idle instance when one is available, otherwise asks the
    /// factory for a new one.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<InstanceLease<F>, PoolError> {
        let permits = Arc::clone(&self.shared.permits);
        let permit = match tokio::time::timeout(timeout, permits.acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(PoolError::Closed),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Rendering pool exhausted");
                return Err(PoolError::Timeout(timeout));
            }
        };

        let reused = self.shared.idle().pop();
        let instance = match reused {
            Some(instance) => instance,
            None => {
                debug!("No idle instance, creating a new one");
                self.shared.factory.create()?
            }
        };

        Ok(InstanceLease {
            instance: Some(instance),
            shared: Arc::clone(&self.shared),
            _permit: permit,
        })
    }

    /// Current occupancy.
    pub fn stats(&self) -> PoolStats {
        let max_total = self.shared.config.max_total;
        PoolStats {
            idle: self.shared.idle().len(),
            in_use: max_total.saturating_sub(self.shared.permits.available_permits()),
            max_total,
        }
    }

    /// Close the pool.
    ///
    /// Waiting and future acquisitions fail with [`PoolError::Closed`], idle
    /// instances are dropped, and leases still checked out are dropped when
    /// they are released.
    pub fn close(&self) {
        let drained = {
            let mut idle = self.shared.idle();
            if self.shared.closed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *idle)
        };
        self.shared.permits.close();
        debug!(closed = drained.len(), "Rendering pool closed");
    }
}

// =============================================================================
// Lease
// =============================================================================

/// Exclusive, scoped ownership of one pooled instance.
///
/// Dereferences to the instance. Dropping the lease hands the instance back to
/// the pool and frees its slot.
pub struct InstanceLease<F: InstanceFactory> {
    instance: Option<F::Instance>,
    shared: Arc<Shared<F>>,
    // Released after the instance is back in the idle list.
    _permit: OwnedSemaphorePermit,
}

impl<F: InstanceFactory> Deref for InstanceLease<F> {
    type Target = F::Instance;

    fn deref(&self) -> &Self::Target {
        self.instance
            .as_ref()
            .unwrap_or_else(|| unreachable!("instance is only taken on drop"))
    }
}

impl<F: InstanceFactory> DerefMut for InstanceLease<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.instance
            .as_mut()
            .unwrap_or_else(|| unreachable!("instance is only taken on drop"))
    }
}

impl<F: InstanceFactory> Drop for InstanceLease<F> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.shared.release(instance);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
