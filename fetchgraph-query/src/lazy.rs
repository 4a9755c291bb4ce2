//! Lazy loading cell for association collections.
//!
//! A [`Lazy`] holds a value that is not loaded until first requested. Sessions
//! are single-threaded, so the cell is a thin wrapper over [`OnceCell`]: once a
//! value is stored it never changes, which lets callers keep plain `&T`
//! borrows into it.
//!
//! # Example
//!
//! ```rust
//! use fetchgraph_query::lazy::Lazy;
//!
//! let songs: Lazy<Vec<&str>> = Lazy::new();
//! assert!(!songs.is_loaded());
//!
//! let loaded = songs.load_with(|| Ok::<_, ()>(vec!["Hype Boy"])).unwrap();
//! assert_eq!(loaded.len(), 1);
//!
//! // The loader only runs once.
//! let again = songs.load_with(|| Err(())).unwrap();
//! assert_eq!(again, &vec!["Hype Boy"]);
//! ```

use std::cell::OnceCell;
use std::fmt;

/// A lazily-loaded value.
pub struct Lazy<T> {
    value: OnceCell<T>,
}

impl<T> Lazy<T> {
    /// Create a new unloaded lazy value.
    pub const fn new() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }

    /// Check if the value has been loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.value.get().is_some()
    }

    /// Get the value if it has been loaded.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Store the value unless one is already present.
    ///
    /// Returns `true` if the value was stored.
    pub fn set(&self, value: T) -> bool {
        self.value.set(value).is_ok()
    }

    /// Load the value using `loader` if it is not loaded yet.
    ///
    /// If loading fails, the error is returned and the cell stays unloaded, so
    /// a later call may try again.
    pub fn load_with<F, E>(&self, loader: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let value = loader()?;
        Ok(self.value.get_or_init(|| value))
    }
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f
                .debug_struct("Lazy")
                .field("state", &"Loaded")
                .field("value", value)
                .finish(),
            None => f.debug_struct("Lazy").field("state", &"Unloaded").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_lazy_new() {
        let lazy: Lazy<i32> = Lazy::new();
        assert!(!lazy.is_loaded());
        assert!(lazy.get().is_none());
    }

    #[test]
    fn test_lazy_set_once() {
        let lazy: Lazy<i32> = Lazy::new();
        assert!(lazy.set(42));
        assert!(!lazy.set(7));
        assert_eq!(lazy.get(), Some(&42));
    }

    #[test]
    fn test_load_with_runs_once() {
        let calls = Cell::new(0);
        let lazy: Lazy<i32> = Lazy::new();

        for _ in 0..3 {
            let value = lazy
                .load_with(|| {
                    calls.set(calls.get() + 1);
                    Ok::<_, ()>(42)
                })
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_load_with_error_stays_unloaded() {
        let lazy: Lazy<i32> = Lazy::new();
        assert_eq!(lazy.load_with(|| Err("closed")), Err("closed"));
        assert!(!lazy.is_loaded());
        assert_eq!(lazy.load_with(|| Ok::<_, &str>(1)), Ok(&1));
    }

    #[test]
    fn test_lazy_debug() {
        assert!(format!("{:?}", Lazy::<i32>::new()).contains("Unloaded"));
        let lazy = Lazy::new();
        lazy.set(1);
        assert!(format!("{:?}", lazy).contains("Loaded"));
    }
}
