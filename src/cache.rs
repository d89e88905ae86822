//! Durable caching of scraped timetable entries.
//!
//! One record per installation: the last successful scrape plus its
//! timestamp. There is no time-based expiry; the user controls freshness
//! through the drop-cache flag.

use crate::error::TimetableError;
use crate::types::RawEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// The persisted cache record: one scrape and when it happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub fetched_at: DateTime<Utc>,
    pub entries: Vec<RawEntry>,
}

/// Storage backing for the cache record.
///
/// [`FileStore`] is the production implementation; tests substitute
/// [`MemoryStore`] so no disk state is involved.
pub trait CacheStore {
    /// Reads the current record, or `None` when nothing has been cached yet.
    fn load(&self) -> Result<Option<CacheRecord>, TimetableError>;

    /// Replaces the stored record. The replacement must be atomic: a
    /// concurrent reader sees either the old record or the new one, never a
    /// torn write.
    fn replace(&self, record: &CacheRecord) -> Result<(), TimetableError>;

    /// Removes the stored record.
    fn clear(&self) -> Result<(), TimetableError>;
}

/// File-backed store holding the record as JSON.
///
/// Writes go to a temp file beside the target and are renamed into place,
/// so readers never observe a partially written record.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<Option<CacheRecord>, TimetableError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    fn replace(&self, record: &CacheRecord) -> Result<(), TimetableError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(record)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TimetableError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<CacheRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: CacheRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<Option<CacheRecord>, TimetableError> {
        Ok(self.record.lock().expect("cache lock poisoned").clone())
    }

    fn replace(&self, record: &CacheRecord) -> Result<(), TimetableError> {
        *self.record.lock().expect("cache lock poisoned") = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TimetableError> {
        *self.record.lock().expect("cache lock poisoned") = None;
        Ok(())
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub entries: Vec<RawEntry>,
    pub fetched_at: DateTime<Utc>,
    /// True when a refresh was attempted and failed, so `entries` come from
    /// the previous record.
    pub stale: bool,
}

/// Cache-or-refresh policy over a store and a fetch operation.
pub struct EntryCache<S: CacheStore> {
    store: S,
}

impl<S: CacheStore> EntryCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns cached entries, invoking `fetch` when forced or when no
    /// usable record exists.
    ///
    /// A fetch failure degrades to the prior record (marked stale) when one
    /// exists; with nothing to fall back to the fetch error is surfaced.
    pub async fn get<F, Fut>(
        &self,
        force_refresh: bool,
        fetch: F,
    ) -> Result<CacheOutcome, TimetableError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<RawEntry>, TimetableError>>,
    {
        // An unreadable record is treated as missing so a refetch can
        // replace it.
        let existing = match self.store.load() {
            Ok(record) => record,
            Err(err) => {
                warn!("cache record is unreadable, refetching: {err}");
                None
            }
        };

        if !force_refresh {
            if let Some(record) = existing {
                debug!(
                    "serving {} cached entries fetched {}",
                    record.entries.len(),
                    record.fetched_at
                );
                return Ok(CacheOutcome {
                    entries: record.entries,
                    fetched_at: record.fetched_at,
                    stale: false,
                });
            }
        }

        match fetch().await {
            Ok(entries) => {
                let record = CacheRecord {
                    fetched_at: Utc::now(),
                    entries,
                };
                self.store.replace(&record)?;
                info!("cached {} freshly scraped entries", record.entries.len());
                Ok(CacheOutcome {
                    entries: record.entries,
                    fetched_at: record.fetched_at,
                    stale: false,
                })
            }
            Err(err) => match existing {
                Some(record) => {
                    warn!(
                        "fetch failed ({err}), serving cached entries from {}",
                        record.fetched_at
                    );
                    Ok(CacheOutcome {
                        entries: record.entries,
                        fetched_at: record.fetched_at,
                        stale: true,
                    })
                }
                None => Err(err),
            },
        }
    }

    /// Drops the stored record entirely.
    pub fn drop_record(&self) -> Result<(), TimetableError> {
        self.store.clear()
    }
}
