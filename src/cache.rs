//! Compute-once, share-forever slot for the cluster view.
//!
//! [`ClusterCache`] holds a single lazily computed value. The first caller runs
//! the computation; callers arriving while it is in flight block until it
//! finishes and then share the same `Arc`. Once a value exists, reads are
//! lock-free.
//!
//! A failed computation is not cached: the slot returns to empty, one waiting
//! caller (or the next caller) runs the computation again.

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use poimap_types::GeoPoint;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error from a bounded wait: the in-flight computation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value still being computed after {waited:?}")]
pub struct WaitTimeout {
    pub waited: Duration,
}

/// Outcome of [`ClusterCache::get_or_try_compute_timeout`].
#[derive(Debug, PartialEq, Eq)]
pub enum CacheError<E> {
    /// This caller ran the computation and it failed
    Compute(E),
    /// Another caller's computation was still running at the deadline
    Timeout(WaitTimeout),
}

/// Single-slot compute-once cache.
///
/// # Examples
///
/// ```rust
/// use poimap::ClusterCache;
///
/// let cache: ClusterCache<u32> = ClusterCache::new();
/// assert_eq!(*cache.get_or_compute(|| 7), 7);
/// // Already filled: the closure is not called again.
/// assert_eq!(*cache.get_or_compute(|| unreachable!()), 7);
/// ```
pub struct ClusterCache<T = Vec<GeoPoint>> {
    value: OnceCell<Arc<T>>,
    in_flight: Mutex<bool>,
    finished: Condvar,
}

impl<T> ClusterCache<T> {
    pub fn new() -> Self {
        Self {
            value: OnceCell::new(),
            in_flight: Mutex::new(false),
            finished: Condvar::new(),
        }
    }

    /// The cached value, if it has been computed.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    pub fn is_computed(&self) -> bool {
        self.value.get().is_some()
    }

    /// Return the cached value, computing it with `compute` if the slot is empty.
    pub fn get_or_compute<F>(&self, compute: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_compute(|| Ok::<T, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`get_or_compute`](Self::get_or_compute).
    ///
    /// On `Err` nothing is cached and the error goes only to this caller.
    pub fn get_or_try_compute<F, E>(&self, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match self.run(compute, None) {
            Ok(value) => Ok(value),
            Err(CacheError::Compute(e)) => Err(e),
            Err(CacheError::Timeout(_)) => unreachable!("unbounded wait cannot time out"),
        }
    }

    /// Like [`get_or_try_compute`](Self::get_or_try_compute), but gives up
    /// waiting on another caller's computation after `timeout`.
    ///
    /// The timeout only bounds waiting. A caller that ends up running the
    /// computation itself runs it to completion.
    pub fn get_or_try_compute_timeout<F, E>(
        &self,
        compute: F,
        timeout: Duration,
    ) -> Result<Arc<T>, CacheError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.run(compute, Some(timeout))
    }

    fn run<F, E>(&self, compute: F, timeout: Option<Duration>) -> Result<Arc<T>, CacheError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            return Ok(Arc::clone(value));
        }

        let started = Instant::now();
        let deadline = timeout.map(|t| started + t);

        {
            let mut in_flight = self.in_flight.lock();
            loop {
                // Re-check under the lock: the computing caller fills the value
                // before clearing the flag.
                if let Some(value) = self.value.get() {
                    return Ok(Arc::clone(value));
                }
                if !*in_flight {
                    *in_flight = true;
                    break;
                }
                match deadline {
                    Some(deadline) => {
                        if self.finished.wait_until(&mut in_flight, deadline).timed_out()
                            && *in_flight
                        {
                            return Err(CacheError::Timeout(WaitTimeout {
                                waited: started.elapsed(),
                            }));
                        }
                    }
                    None => self.finished.wait(&mut in_flight),
                }
            }
        }

        let guard = InFlightGuard { cache: self };
        let result = compute();

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                // Only the flag holder reaches this point, so the cell is empty.
                let stored = Arc::clone(self.value.get_or_init(|| value));
                drop(guard);
                Ok(stored)
            }
            Err(e) => {
                drop(guard);
                Err(CacheError::Compute(e))
            }
        }
    }
}

impl<T> Default for ClusterCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ClusterCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterCache")
            .field("computed", &self.is_computed())
            .field("in_flight", &*self.in_flight.lock())
            .finish()
    }
}

/// Clears the in-flight flag and wakes waiters, also when `compute` panics.
struct InFlightGuard<'a, T> {
    cache: &'a ClusterCache<T>,
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        *self.cache.in_flight.lock() = false;
        self.cache.finished.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_computes_once() {
        let cache = ClusterCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            let value = cache.get_or_compute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![GeoPoint::cluster(3, 1.0, 2.0)]
            });
            assert_eq!(value.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_computed());
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        const CALLERS: usize = 16;
        let cache = Arc::new(ClusterCache::<Vec<u64>>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_compute(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        (0..100).collect()
                    })
                })
            })
            .collect();

        let results: Vec<Arc<Vec<u64>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for r in &results {
            assert!(Arc::ptr_eq(r, &results[0]));
        }
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache: ClusterCache<u32> = ClusterCache::new();

        let first: Result<_, &str> = cache.get_or_try_compute(|| Err("bad seed"));
        assert_eq!(first.unwrap_err(), "bad seed");
        assert!(!cache.is_computed());

        let second: Result<_, &str> = cache.get_or_try_compute(|| Ok(5));
        assert_eq!(*second.unwrap(), 5);
        assert_eq!(cache.get().as_deref(), Some(&5));
    }

    #[test]
    fn test_waiter_retries_after_failure() {
        let cache = Arc::new(ClusterCache::<u32>::new());
        let started = Arc::new(Barrier::new(2));

        let failing = {
            let cache = Arc::clone(&cache);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                cache.get_or_try_compute(|| {
                    started.wait();
                    thread::sleep(Duration::from_millis(50));
                    Err::<u32, _>("first attempt failed")
                })
            })
        };

        started.wait();
        let waiter = cache.get_or_try_compute(|| Ok::<_, &str>(9));

        assert!(failing.join().unwrap().is_err());
        assert_eq!(*waiter.unwrap(), 9);
    }

    #[test]
    fn test_wait_timeout() {
        let cache = Arc::new(ClusterCache::<u32>::new());
        let started = Arc::new(Barrier::new(2));

        let slow = {
            let cache = Arc::clone(&cache);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                cache.get_or_compute(|| {
                    started.wait();
                    thread::sleep(Duration::from_millis(300));
                    1
                })
            })
        };

        started.wait();
        let result = cache
            .get_or_try_compute_timeout(|| Ok::<_, ()>(2), Duration::from_millis(20));
        assert!(matches!(result, Err(CacheError::Timeout(_))));

        assert_eq!(*slow.join().unwrap(), 1);
        let after = cache.get_or_try_compute_timeout(|| Ok::<_, ()>(2), Duration::from_millis(20));
        assert_eq!(*after.unwrap(), 1);
    }

    #[test]
    fn test_panic_in_compute_releases_waiters() {
        let cache = Arc::new(ClusterCache::<u32>::new());

        let panicking = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get_or_compute(|| panic!("compute blew up")))
        };
        assert!(panicking.join().is_err());

        assert!(!cache.is_computed());
        assert_eq!(*cache.get_or_compute(|| 3), 3);
    }
}
