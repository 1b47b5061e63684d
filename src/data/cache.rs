//! Dataset Cache Module
//! Process-lifetime cache so the remote tables are fetched at most once.

use crate::data::{Dataset, LoaderError};
use log::{debug, info};
use std::sync::{Arc, Mutex, OnceLock};

static SHARED: DatasetCache = DatasetCache::new();

/// Lazily initialised, read-only dataset.
///
/// The first caller runs the loader while holding `init`; callers that race
/// it wait on the lock and then find the cell filled. Failures are not cached.
pub struct DatasetCache {
    cell: OnceLock<Arc<Dataset>>,
    init: Mutex<()>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The cache shared by the whole process.
    pub fn shared() -> &'static DatasetCache {
        &SHARED
    }

    /// Cached dataset, if a load already succeeded.
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }

    /// Return the cached dataset or run `load` to produce it.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<Dataset>, LoaderError>
    where
        F: FnOnce() -> Result<Dataset, LoaderError>,
    {
        if let Some(dataset) = self.get() {
            debug!("dataset served from cache");
            return Ok(dataset);
        }

        // A poisoned lock only means a previous loader panicked; the cell is
        // still consistent.
        let _guard = self.init.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(dataset) = self.get() {
            return Ok(dataset);
        }

        let dataset = Arc::new(load()?);
        info!("dataset cached for this session");
        Ok(self.cell.get_or_init(|| dataset).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, TableKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn small_dataset() -> Dataset {
        Dataset::from_records(vec![fixtures::hospital("1", "General Hospital", "TX")], vec![])
    }

    #[test]
    fn test_loads_once() {
        let cache = DatasetCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(small_dataset())
            })
            .unwrap();
        let second = cache
            .get_or_load(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(small_dataset())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache = DatasetCache::new();
        let err = cache.get_or_load(|| Err(LoaderError::Empty(TableKind::Hospital)));
        assert!(err.is_err());
        assert!(cache.get().is_none());

        let dataset = cache.get_or_load(|| Ok(small_dataset())).unwrap();
        assert_eq!(dataset.hospital_count(), 1);
    }

    #[test]
    fn test_concurrent_first_access_is_single_flight() {
        let cache = Arc::new(DatasetCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache
                        .get_or_load(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            Ok(small_dataset())
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
