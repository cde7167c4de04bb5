//! Single-flight lazily loaded value.

use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A value loaded at most once until invalidated.
///
/// Concurrent callers that arrive while the first load is running wait for
/// it instead of starting their own. A failed load leaves the slot empty, so
/// the next caller tries again.
pub struct SharedFetch<V> {
    slot: RwLock<Arc<OnceCell<Arc<V>>>>,
}

impl<V> SharedFetch<V> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    /// Return the loaded value, running `load` if nothing is cached yet.
    pub async fn get_or_try_load<F, Fut, E>(&self, load: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // Hold our own handle so an invalidate during the load swaps in a
        // fresh cell without disturbing the callers of this one.
        let cell = self.slot.read().clone();
        let value = cell
            .get_or_try_init(|| async move { load().await.map(Arc::new) })
            .await?;
        Ok(value.clone())
    }

    /// The cached value, if a load has completed.
    pub fn get(&self) -> Option<Arc<V>> {
        self.slot.read().get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().initialized()
    }

    /// Forget the cached value; the next caller loads again.
    pub fn invalidate(&self) {
        *self.slot.write() = Arc::new(OnceCell::new());
        gazette_log::debug!(target: "gazette_cache", "shared value invalidated");
    }
}

impl<V> Default for SharedFetch<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_loads_once() {
        let fetch: SharedFetch<String> = SharedFetch::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = fetch
                .get_or_try_load(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("settings".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value.as_str(), "settings");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fetch.is_loaded());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let fetch: SharedFetch<u32> = SharedFetch::new();

        let err = fetch
            .get_or_try_load(|| async { Err::<u32, _>("offline") })
            .await
            .unwrap_err();
        assert_eq!(err, "offline");
        assert!(fetch.get().is_none());

        let value = fetch
            .get_or_try_load(|| async { Ok::<_, &str>(5) })
            .await
            .unwrap();
        assert_eq!(*value, 5);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let fetch: SharedFetch<u32> = SharedFetch::new();
        fetch
            .get_or_try_load(|| async { Ok::<_, ()>(1) })
            .await
            .unwrap();

        fetch.invalidate();
        assert!(!fetch.is_loaded());

        let value = fetch
            .get_or_try_load(|| async { Ok::<_, ()>(2) })
            .await
            .unwrap();
        assert_eq!(*value, 2);
    }
}
