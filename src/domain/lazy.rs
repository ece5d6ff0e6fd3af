//! Lazily loaded entity fields.
//!
//! A lazy field starts `Unloaded` and moves to `Loaded` exactly once, inside
//! its accessor. There is no path back to `Unloaded`: a caller that wants
//! fresh data fetches a new owning entity.
//!
//! # Concurrency
//!
//! The check and the set are two separate critical sections with the fetch in
//! between. Two callers reading the same unloaded field at the same time can
//! both run the fetch; the first value stored wins and both callers observe
//! it. Entities are not meant to be shared across concurrent readers.

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

/// Load state of a lazy field.
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Unloaded,
    Loaded(T),
}

/// A field fetched on first read and memoized for the owner's lifetime.
#[derive(Debug)]
pub struct LazyField<T> {
    state: RwLock<LoadState<Arc<T>>>,
}

impl<T> Default for LazyField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazyField<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LoadState::Unloaded),
        }
    }

    /// A field that never needs a fetch.
    pub fn loaded(value: T) -> Self {
        Self {
            state: RwLock::new(LoadState::Loaded(Arc::new(value))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.read(), LoadState::Loaded(_))
    }

    /// The stored value, if the field has been loaded.
    pub fn peek(&self) -> Option<Arc<T>> {
        match &*self.state.read() {
            LoadState::Loaded(value) => Some(Arc::clone(value)),
            LoadState::Unloaded => None,
        }
    }

    /// Return the stored value, running `fetch` first if still unloaded.
    ///
    /// A failed fetch leaves the field unloaded.
    pub async fn get_or_load<F, Fut, E>(&self, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.peek() {
            return Ok(value);
        }

        let fetched = fetch().await?;

        let mut state = self.state.write();
        match &*state {
            LoadState::Loaded(existing) => Ok(Arc::clone(existing)),
            LoadState::Unloaded => {
                let value = Arc::new(fetched);
                *state = LoadState::Loaded(Arc::clone(&value));
                Ok(value)
            }
        }
    }
}
