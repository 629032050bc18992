//! Memoized registry table with manual invalidation
//!
//! The cache owns the only reference to the current table. It loads lazily on
//! first access and keeps the result until [`TableCache::invalidate`] is
//! called. Rebuilds are serialized and published by swapping the `Arc`, so a
//! reader holding the previous table keeps a complete snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::core::loader::{LoadError, TableSource};
use crate::core::record::AssetTable;

/// Process-wide holder for the normalized table
pub struct TableCache<S: TableSource> {
    source: S,
    table: RwLock<Option<Arc<AssetTable>>>,
    rebuild: Mutex<()>,
    epoch: AtomicU64,
}

impl<S: TableSource> TableCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            table: RwLock::new(None),
            rebuild: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached table, loading it first if the cache is empty
    ///
    /// A failed load leaves the cache empty, so the next call retries.
    pub fn get_or_load(&self) -> Result<Arc<AssetTable>, LoadError> {
        if let Some(table) = self.current() {
            return Ok(table);
        }

        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished loading while we waited.
        if let Some(table) = self.current() {
            return Ok(table);
        }

        let table = Arc::new(self.source.load()?);
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(epoch, rows = table.len(), "registry cache filled");

        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table; the next access reloads from the source
    pub fn invalidate(&self) {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!(epoch = self.epoch(), "registry cache invalidated");
        }
    }

    /// The cached table, if one is loaded
    pub fn current(&self) -> Option<Arc<AssetTable>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Number of successful loads so far
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}
