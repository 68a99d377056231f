//! Query cache for consolidated vault views.
//!
//! Each key carries a generation counter. `invalidate` bumps it, which marks
//! the stored snapshot stale and wakes any poller watching the key. A write
//! is accepted only if the generation it was read under is still current, so
//! a read that raced an invalidation never lands.
//!
//! Entries live as long as a poller holds a [`CacheLease`] on them. When the
//! last lease on a key drops, the entry is evicted.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::types::{VaultKey, VaultSnapshot};

/// A cached snapshot and its freshness
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub snapshot: VaultSnapshot,
    pub generation: u64,
    /// Set by `invalidate` until the next accepted write
    pub stale: bool,
}

impl CachedSnapshot {
    /// The snapshot, unless it has been invalidated since it was stored
    pub fn fresh(self) -> Option<VaultSnapshot> {
        (!self.stale).then_some(self.snapshot)
    }
}

struct Entry {
    id: u64,
    leases: usize,
    snapshot: Option<VaultSnapshot>,
    stale: bool,
    generation: watch::Sender<u64>,
}

impl Entry {
    fn new(id: u64) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            id,
            leases: 0,
            snapshot: None,
            stale: false,
            generation,
        }
    }
}

#[derive(Default)]
pub struct VaultCache {
    entries: RwLock<HashMap<VaultKey, Entry>>,
    next_id: AtomicU64,
}

impl VaultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &VaultKey) -> Option<CachedSnapshot> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        let snapshot = entry.snapshot.clone()?;
        let generation = *entry.generation.borrow();
        Some(CachedSnapshot {
            snapshot,
            generation,
            stale: entry.stale,
        })
    }

    /// Current generation; zero for keys with no live entry
    pub fn generation(&self, key: &VaultKey) -> u64 {
        self.entries
            .read()
            .get(key)
            .map(|entry| *entry.generation.borrow())
            .unwrap_or(0)
    }

    /// Number of keys currently held open by pollers
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hold `key` open and watch it for invalidations
    pub fn lease(self: &Arc<Self>, key: &VaultKey) -> CacheLease {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(self.next_id.fetch_add(1, Ordering::Relaxed)));
        entry.leases += 1;

        CacheLease {
            cache: Arc::clone(self),
            key: key.clone(),
            entry_id: entry.id,
            invalidations: entry.generation.subscribe(),
        }
    }

    /// Store `snapshot` if `generation` is still current. Returns whether the
    /// write was accepted. Keys nobody holds a lease on are not cached.
    pub fn store(&self, key: &VaultKey, generation: u64, snapshot: VaultSnapshot) -> bool {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        let current = *entry.generation.borrow();
        if current != generation {
            debug!(%key, generation, current, "discarding snapshot read before invalidation");
            return false;
        }
        entry.snapshot = Some(snapshot);
        entry.stale = false;
        true
    }

    /// Mark `key` stale and wake its pollers. A no-op when nothing is
    /// watching the key.
    pub fn invalidate(&self, key: &VaultKey) {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(key) else {
            debug!(%key, "no live subscription to invalidate");
            return;
        };
        entry.stale = true;
        entry.generation.send_modify(|generation| *generation += 1);
        debug!(%key, generation = *entry.generation.borrow(), "invalidated vault view");
    }

    /// Drop the entry. Pollers watching it stop.
    pub fn remove(&self, key: &VaultKey) {
        self.entries.write().remove(key);
    }

    fn release(&self, key: &VaultKey, entry_id: u64) {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        // The entry was removed and recreated since this lease was taken
        if entry.id != entry_id {
            return;
        }
        entry.leases = entry.leases.saturating_sub(1);
        if entry.leases == 0 {
            entries.remove(key);
            debug!(%key, "evicted vault view");
        }
    }
}

/// A poller's hold on one cache key. Dropping the last lease evicts the entry.
pub struct CacheLease {
    cache: Arc<VaultCache>,
    key: VaultKey,
    entry_id: u64,
    invalidations: watch::Receiver<u64>,
}

impl CacheLease {
    pub fn key(&self) -> &VaultKey {
        &self.key
    }

    /// Generation to read under. Marks the current invalidation as seen.
    pub fn generation(&mut self) -> u64 {
        *self.invalidations.borrow_and_update()
    }

    /// Wait for the next invalidation. `false` once the entry has been removed.
    pub async fn invalidated(&mut self) -> bool {
        self.invalidations.changed().await.is_ok()
    }
}

impl Drop for CacheLease {
    fn drop(&mut self) {
        self.cache.release(&self.key, self.entry_id);
    }
}
