use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::loader::{self, DataLoadError};
use super::model::Dataset;

/// Reload interval matching the original dashboard's hourly cache window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// DatasetCache – the one memoized operation in the pipeline
// ---------------------------------------------------------------------------

/// Explicit cache handle for the loaded dataset.
///
/// Loading dominates the cost of every interaction, so the dataset is loaded
/// once and shared as `Arc<Dataset>`; pipeline stages receive `&Dataset` and
/// never touch the cache. The entry is invalidated when the source path
/// changes or its age exceeds the TTL. Staleness is a freshness policy, not
/// a correctness requirement.
pub struct DatasetCache {
    ttl: Duration,
    slot: Mutex<Option<Entry>>,
}

struct Entry {
    path: PathBuf,
    loaded_at: Instant,
    dataset: Arc<Dataset>,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        DatasetCache {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached dataset for `path`, reloading when absent, stale, or
    /// cached for a different path.
    pub fn get(&self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        let mut slot = self.slot.lock().expect("cache lock poisoned");

        if let Some(entry) = slot.as_ref() {
            if entry.path == path && entry.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        log::info!("loading dataset from {}", path.display());
        let dataset = Arc::new(loader::load_file(path)?);
        log::info!(
            "loaded {} observations, {} years, {} stations",
            dataset.len(),
            dataset.years().len(),
            dataset.stations().len()
        );

        *slot = Some(Entry {
            path: path.to_path_buf(),
            loaded_at: Instant::now(),
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// Drop the cached entry so the next `get` reloads.
    pub fn invalidate(&self) {
        *self.slot.lock().expect("cache lock poisoned") = None;
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        DatasetCache::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_csv(station: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        writeln!(
            file,
            "year,month,hour,station,PM2.5,PM10,SO2,NO2,CO,O3,AQI,Category_AQI,TEMP,PRES,WSPM,RAIN"
        )
        .unwrap();
        writeln!(
            file,
            "2013,1,0,{station},10,20,3,4,500,60,50,Good,10,1010,2,0"
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn fresh_entry_is_shared_not_reloaded() {
        let file = sample_csv("A");
        let cache = DatasetCache::new(Duration::from_secs(600));
        let a = cache.get(file.path()).expect("first load");
        let b = cache.get(file.path()).expect("cached load");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn zero_ttl_reloads_every_time() {
        let file = sample_csv("A");
        let cache = DatasetCache::new(Duration::ZERO);
        let a = cache.get(file.path()).expect("first load");
        let b = cache.get(file.path()).expect("stale reload");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn path_change_invalidates_the_entry() {
        let first = sample_csv("A");
        let second = sample_csv("B");
        let cache = DatasetCache::new(Duration::from_secs(600));

        let a = cache.get(first.path()).expect("load first");
        let b = cache.get(second.path()).expect("load second");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.stations().iter().next().map(String::as_str), Some("B"));
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let file = sample_csv("A");
        let cache = DatasetCache::new(Duration::from_secs(600));
        let a = cache.get(file.path()).expect("first load");
        cache.invalidate();
        let b = cache.get(file.path()).expect("reload");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn load_errors_propagate() {
        let cache = DatasetCache::default();
        assert!(cache.get(Path::new("nope.csv")).is_err());
    }
}
