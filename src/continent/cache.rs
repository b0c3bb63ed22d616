use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::classifier::Classification;
use super::label::ContinentLabel;
use crate::error::Unresolved;

/// Persisted classifier answers older than this are looked up again.
pub const DEFAULT_TTL_DAYS: i64 = 30;

pub type Resolution = Result<ContinentLabel, Unresolved>;

/// Configuration for the on-disk classifier cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: get_cache_path(),
        }
    }
}

/// Get the platform-appropriate cache directory for classifier answers
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("wealth-atlas/classifier-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/wealth-atlas/classifier-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Remove the on-disk cache directory
pub fn clear_cache(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Serializable classifier answer for disk storage
#[derive(Serialize, Deserialize)]
struct DiskCacheEntry {
    classification: Classification,
    cached_at: DateTime<Utc>,
}

struct CacheData {
    snapshot: Option<u64>,
    resolved: HashMap<String, Resolution>, // country name -> final resolution
    hits: usize,
    misses: usize,
}

/// Read-through cache of continent resolutions.
///
/// Two layers:
/// - resolutions in memory, scoped to one dataset snapshot and dropped as soon as
///   a snapshot with a different fingerprint begins
/// - raw classifier answers on disk (cacache), shared across runs and keyed by
///   classifier kind, so override-table edits never need a disk purge
///
/// Failed lookups live only in memory; a timeout today should not pin a country
/// to `Unresolved` next week.
#[derive(Clone)]
pub struct ResolutionCache {
    inner: Arc<Mutex<CacheData>>,
    disk_path: Option<PathBuf>,
    ttl: Duration,
}

/// Counters for the current snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ResolutionCache {
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheData {
                snapshot: None,
                resolved: HashMap::new(),
                hits: 0,
                misses: 0,
            })),
            disk_path: None,
            ttl: Duration::days(DEFAULT_TTL_DAYS),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::with_disk(config.path.clone(), Duration::days(DEFAULT_TTL_DAYS))
        } else {
            Self::in_memory()
        }
    }

    pub fn with_disk(path: PathBuf, ttl: Duration) -> Self {
        Self {
            disk_path: Some(path),
            ttl,
            ..Self::in_memory()
        }
    }

    fn data(&self) -> MutexGuard<'_, CacheData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scope the in-memory layer to a dataset snapshot.
    ///
    /// Returns true when previous resolutions were discarded.
    pub fn begin_snapshot(&self, fingerprint: u64) -> bool {
        let mut data = self.data();
        if data.snapshot == Some(fingerprint) {
            return false;
        }
        let invalidated = !data.resolved.is_empty();
        data.snapshot = Some(fingerprint);
        data.resolved.clear();
        data.hits = 0;
        data.misses = 0;
        if invalidated {
            debug!("Dataset snapshot changed, dropped cached resolutions");
        }
        invalidated
    }

    pub fn get(&self, country: &str) -> Option<Resolution> {
        let mut data = self.data();
        match data.resolved.get(country).cloned() {
            Some(found) => {
                data.hits += 1;
                Some(found)
            }
            None => {
                data.misses += 1;
                None
            }
        }
    }

    /// Last writer wins; resolution is deterministic so racing writers agree anyway.
    pub fn insert(&self, country: &str, resolution: Resolution) {
        self.data().resolved.insert(country.to_string(), resolution);
    }

    pub fn stats(&self) -> CacheStats {
        let data = self.data();
        CacheStats {
            entries: data.resolved.len(),
            hits: data.hits,
            misses: data.misses,
        }
    }

    /// Read a persisted classifier answer, if present and fresh
    pub fn load_classification(&self, kind: &str, country: &str) -> Option<Classification> {
        let path = self.disk_path.as_ref()?;
        let bytes = cacache::read_sync(path, disk_key(kind, country)).ok()?;
        let entry: DiskCacheEntry = serde_json::from_slice(&bytes).ok()?;
        if Utc::now() - entry.cached_at >= self.ttl {
            return None;
        }
        Some(entry.classification)
    }

    /// Persist a classifier answer (fire-and-forget; failures are never stored)
    pub fn store_classification(&self, kind: &str, country: &str, classification: &Classification) {
        let Some(path) = self.disk_path.as_ref() else {
            return;
        };
        if classification.is_failure() {
            return;
        }
        let entry = DiskCacheEntry {
            classification: classification.clone(),
            cached_at: Utc::now(),
        };
        if let Ok(serialized) = serde_json::to_vec(&entry) {
            if let Err(e) = cacache::write_sync(path, disk_key(kind, country), serialized) {
                debug!("Failed to persist classifier answer for '{}': {}", country, e);
            }
        }
    }
}

fn disk_key(kind: &str, country: &str) -> String {
    format!("classifier:{}:{}", kind, country)
}
