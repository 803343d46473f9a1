//! Rate cache: typed access over a string key/value store

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::common::errors::{CalcError, Result};
use crate::common::traits::RateStore;
use crate::common::types::{RateKind, RateQuote, RateSource};

/// Store key holding the rate value for `(kind, currency)`
pub fn rate_key(kind: RateKind, currency: &str) -> String {
    match kind {
        RateKind::Local => format!("{}LocalRate", currency),
        RateKind::ToUsd => format!("{}USDRate", currency),
    }
}

/// Store key holding the fetch timestamp for `(kind, currency)`
pub fn timestamp_key(kind: RateKind, currency: &str) -> String {
    match kind {
        RateKind::Local => format!("{}RateTimestamp", currency),
        RateKind::ToUsd => format!("{}USDRateTimestamp", currency),
    }
}

/// Typed rate cache over any [`RateStore`]
#[derive(Clone)]
pub struct RateCache {
    store: Arc<dyn RateStore>,
}

impl RateCache {
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self { store }
    }

    /// Cache backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRateStore::new()))
    }

    /// Stored rate for `(kind, currency)`, regardless of age.
    ///
    /// Entries with a missing or unparsable value or timestamp are ignored.
    pub fn get(&self, kind: RateKind, currency: &str) -> Option<RateQuote> {
        let rate: Decimal = self.store.get(&rate_key(kind, currency))?.trim().parse().ok()?;
        let fetched_at = self.timestamp(kind, currency)?;
        Some(RateQuote::new(currency, kind, rate, fetched_at, RateSource::Cached))
    }

    /// Fetch timestamp stored for `(kind, currency)`
    pub fn timestamp(&self, kind: RateKind, currency: &str) -> Option<i64> {
        self.store
            .get(&timestamp_key(kind, currency))?
            .trim()
            .parse()
            .ok()
    }

    /// Stored rate if it is younger than `freshness_ms` at `now_millis`
    pub fn get_fresh(
        &self,
        kind: RateKind,
        currency: &str,
        now_millis: i64,
        freshness_ms: i64,
    ) -> Option<RateQuote> {
        self.get(kind, currency)
            .filter(|quote| quote.is_fresh(now_millis, freshness_ms))
    }

    /// Persist a quote's value and timestamp, overwriting earlier entries
    pub fn set(&self, quote: &RateQuote) -> Result<()> {
        self.store.set(
            &rate_key(quote.kind, &quote.currency_code),
            &quote.rate_value.to_string(),
        )?;
        self.store.set(
            &timestamp_key(quote.kind, &quote.currency_code),
            &quote.fetched_at_epoch_millis.to_string(),
        )
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

impl std::fmt::Debug for RateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateCache").finish_non_exhaustive()
    }
}

fn read_entries(lock: &RwLock<HashMap<String, String>>) -> RwLockReadGuard<'_, HashMap<String, String>> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_entries(lock: &RwLock<HashMap<String, String>>) -> RwLockWriteGuard<'_, HashMap<String, String>> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Stores
// ============================================================================

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        read_entries(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateStore for MemoryRateStore {
    fn get(&self, key: &str) -> Option<String> {
        read_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        write_entries(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        write_entries(&self.entries).clear();
        Ok(())
    }
}

/// Store persisted as a flat JSON object on disk.
///
/// The whole file is rewritten on every `set`; it is created on first write.
#[derive(Debug)]
pub struct JsonFileRateStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileRateStore {
    /// Open the store, loading existing entries if the file exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| CalcError::Cache(format!("{}: {}", path.display(), e)))?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            HashMap::new()
        };
        debug!("Opened rate store {} with {} entries", path.display(), entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CalcError::Cache(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
            .map_err(|e| CalcError::Cache(format!("{}: {}", self.path.display(), e)))
    }
}

impl RateStore for JsonFileRateStore {
    fn get(&self, key: &str) -> Option<String> {
        read_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = write_entries(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = write_entries(&self.entries);
        entries.clear();
        self.persist(&entries)
    }
}
