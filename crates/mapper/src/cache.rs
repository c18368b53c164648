//! Path-keyed memoization for one graph build.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Computes each path's value at most once.
///
/// Concurrent callers asking for the same path await the same computation.
/// A failed computation leaves the slot empty, so the error reaches every
/// caller that was waiting on it through its own initializer.
pub struct PathCache<T> {
    slots: Mutex<HashMap<PathBuf, Slot<T>>>,
}

impl<T> Default for PathCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> PathCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an empty slot for `path` if there is none and return it.
    fn slot(&self, path: &Path) -> Slot<T> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Whether `path` has been requested before.
    pub fn contains(&self, path: &Path) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    /// Get the value for `path`, computing it with `init` if needed.
    ///
    /// The boolean is `true` for the caller whose `init` produced the value.
    ///
    /// # Errors
    ///
    /// Returns the error of `init`.
    pub async fn get_or_try_init<F, Fut, E>(&self, path: &Path, init: F) -> Result<(Arc<T>, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = self.slot(path);
        let mut initialized = false;
        let flag = &mut initialized;
        let value = slot
            .get_or_try_init(move || async move {
                *flag = true;
                init().await.map(Arc::new)
            })
            .await?;
        Ok((Arc::clone(value), initialized))
    }

    /// Every computed value keyed by path. Slots whose computation never
    /// finished are skipped.
    pub fn entries(&self) -> BTreeMap<PathBuf, Arc<T>> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|(path, slot)| slot.get().map(|value| (path.clone(), Arc::clone(value))))
            .collect()
    }
}
