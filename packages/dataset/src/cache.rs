//! Process-wide memoization of the loaded dataset.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crime_eda_incident_models::IncidentTable;

use crate::{DatasetError, load_table};

/// A loaded table together with the file version it came from.
struct Cached {
    modified: Option<SystemTime>,
    table: Arc<IncidentTable>,
}

/// Lazily loads the dataset once and hands out shared, immutable copies.
///
/// The first [`DatasetCache::load`] parses the file while holding the lock,
/// so concurrent callers wait for that single load instead of racing it.
/// Later calls return the same [`Arc`] until the file's modification time
/// changes.
pub struct DatasetCache {
    path: PathBuf,
    state: Mutex<Option<Cached>>,
    loads: AtomicUsize,
}

impl DatasetCache {
    /// Creates an empty cache for the dataset at `path`. Nothing is read
    /// until the first [`DatasetCache::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// Path of the backing dataset file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times the backing file has actually been parsed.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Returns the cached table, loading it first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file has never been loaded
    /// successfully and cannot be loaded now.
    pub fn load(&self) -> Result<Arc<IncidentTable>, DatasetError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let modified = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.modified().ok(),
            Err(source) => {
                if let Some(cached) = state.as_ref() {
                    log::warn!(
                        "Dataset {} is no longer readable ({source}), serving cached copy",
                        self.path.display()
                    );
                    return Ok(Arc::clone(&cached.table));
                }
                return Err(DatasetError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if let Some(cached) = state.as_ref()
            && cached.modified == modified
        {
            return Ok(Arc::clone(&cached.table));
        }

        if state.is_some() {
            log::info!("Dataset {} changed on disk, reloading", self.path.display());
        }

        let table = Arc::new(load_table(&self.path)?);
        self.loads.fetch_add(1, Ordering::Relaxed);

        *state = Some(Cached {
            modified,
            table: Arc::clone(&table),
        });

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::time::Duration;

    use super::*;

    const CSV: &str = "Date_Reported,Date_Occurred,Victim_Age,Victim_Sex,Victim_Descent,Weapon_Description,Status_Description,Crime_Category\n\
        01/02/2023,01/01/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes\n";

    fn write_dataset(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("incidents.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn repeated_loads_share_one_table() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(write_dataset(&dir, CSV));

        let first = cache.load().unwrap();
        let second = cache.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn reloads_when_the_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, CSV);
        let cache = DatasetCache::new(&path);
        let first = cache.load().unwrap();

        let extra = format!(
            "{CSV}01/03/2023,01/02/2023 10:00:00 AM,40,F,B,UNKNOWN,Adult Arrest,Property Crimes\n"
        );
        write_dataset(&dir, &extra);
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        let second = cache.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn keeps_serving_after_the_file_disappears() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(&dir, CSV);
        let cache = DatasetCache::new(&path);
        let first = cache.load().unwrap();

        std::fs::remove_file(&path).unwrap();

        let second = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_on_first_load_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path().join("missing.csv"));
        assert!(matches!(cache.load(), Err(DatasetError::Io { .. })));
        assert_eq!(cache.load_count(), 0);
    }

    #[test]
    fn concurrent_first_loads_parse_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(DatasetCache::new(write_dataset(&dir, CSV)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.load().unwrap())
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(cache.load_count(), 1);
        assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
