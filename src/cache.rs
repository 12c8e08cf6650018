//! Call-site-owned value cache
//!
//! [`ValueCache`] replaces "remember it in a global" shortcuts: the cache is
//! an ordinary value with the lifetime of whoever owns it, and the only way
//! to read it is get-cached-or-compute.

use std::future::Future;

/// Holds at most one computed value until invalidated
#[derive(Debug, Clone)]
pub struct ValueCache<T> {
    value: Option<T>,
    hits: u64,
    misses: u64,
}

impl<T> Default for ValueCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueCache<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Cache pre-filled with `value`
    pub fn with_value(value: T) -> Self {
        Self {
            value: Some(value),
            hits: 0,
            misses: 0,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.value.is_some()
    }

    /// Cached value, computing and storing it first if absent
    pub fn get_or_compute<F>(&mut self, compute: F) -> &T
    where
        F: FnOnce() -> T,
    {
        let value = match self.value.take() {
            Some(value) => {
                self.hits += 1;
                value
            }
            None => {
                self.misses += 1;
                compute()
            }
        };
        self.value.insert(value)
    }

    /// Like [`get_or_compute`](Self::get_or_compute); a failed computation
    /// leaves the cache empty
    pub fn get_or_try_compute<E, F>(&mut self, compute: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let value = match self.value.take() {
            Some(value) => {
                self.hits += 1;
                value
            }
            None => {
                self.misses += 1;
                compute()?
            }
        };
        Ok(self.value.insert(value))
    }

    /// Async form: a cache hit completes without suspending
    pub async fn get_or_compute_async<F, Fut>(&mut self, compute: F) -> &T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let value = match self.value.take() {
            Some(value) => {
                self.hits += 1;
                value
            }
            None => {
                self.misses += 1;
                log::trace!("ValueCache miss, computing asynchronously");
                compute().await
            }
        };
        self.value.insert(value)
    }

    /// Drop the cached value, returning it
    pub fn invalidate(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
