//! Marker persistence and change notification.
//!
//! Stores notify a listener whenever a resource's markers change. Inside a
//! [`Batch`] those notifications are held back and delivered together, once,
//! when the outermost batch is dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Marker, MarkerError, MarkerKind};
use crate::identity::FileId;

/// Callback receiving the resources whose markers changed.
pub type ChangeListener = Box<dyn Fn(&[FileId]) + Send + Sync>;

/// Persistence for markers attached to resources.
pub trait MarkerStore: Send + Sync {
    /// Attach `marker` to `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError`] when the store rejects the marker.
    fn add(&self, resource: &FileId, marker: Marker) -> Result<(), MarkerError>;

    /// Remove the markers of the given kinds from `resource` only, returning
    /// how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError`] when the store cannot delete.
    fn delete(&self, resource: &FileId, kinds: &[MarkerKind]) -> Result<usize, MarkerError>;

    /// Markers currently attached to `resource`, in insertion order.
    fn markers(&self, resource: &FileId) -> Vec<Marker>;

    /// Enter a batch. Prefer [`Batch::open`], which pairs this with
    /// [`MarkerStore::end_batch`].
    fn begin_batch(&self);

    /// Leave a batch, flushing notifications if it was the outermost one.
    fn end_batch(&self);

    /// Open a batch guard on this store.
    fn batch(&self) -> Batch<'_>
    where
        Self: Sized,
    {
        Batch::open(self)
    }
}

/// RAII guard that keeps a store in batch mode while alive.
///
/// Dropping the guard closes the batch, including on early return and while
/// unwinding from a panic.
#[must_use = "the batch closes as soon as the guard is dropped"]
pub struct Batch<'a> {
    store: &'a dyn MarkerStore,
}

impl<'a> Batch<'a> {
    /// Open a batch on `store`.
    pub fn open(store: &'a dyn MarkerStore) -> Self {
        store.begin_batch();
        Self { store }
    }
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        self.store.end_batch();
    }
}

impl fmt::Debug for Batch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct BatchState {
    depth: usize,
    pending: BTreeSet<FileId>,
}

/// Marker store kept in memory, as used by the language server.
#[derive(Default)]
pub struct InMemoryMarkerStore {
    markers: RwLock<BTreeMap<FileId, Vec<Marker>>>,
    batch: Mutex<BatchState>,
    listener: Option<ChangeListener>,
}

impl InMemoryMarkerStore {
    /// Create a store without a listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that reports changed resources to `listener`.
    #[must_use]
    pub fn with_listener(listener: ChangeListener) -> Self {
        Self {
            listener: Some(listener),
            ..Self::default()
        }
    }

    /// Resources that currently carry markers.
    #[must_use]
    pub fn resources(&self) -> Vec<FileId> {
        self.read().keys().cloned().collect()
    }

    /// Whether a batch is currently open.
    #[must_use]
    pub fn in_batch(&self) -> bool {
        self.batch_state().depth > 0
    }

    fn changed(&self, resource: &FileId) {
        let mut state = self.batch_state();
        if state.depth > 0 {
            state.pending.insert(resource.clone());
            return;
        }
        drop(state);
        self.notify(std::slice::from_ref(resource));
    }

    fn notify(&self, resources: &[FileId]) {
        if let Some(listener) = &self.listener {
            listener(resources);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<FileId, Vec<Marker>>> {
        self.markers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<FileId, Vec<Marker>>> {
        self.markers.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn batch_state(&self) -> MutexGuard<'_, BatchState> {
        self.batch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MarkerStore for InMemoryMarkerStore {
    fn add(&self, resource: &FileId, marker: Marker) -> Result<(), MarkerError> {
        self.write().entry(resource.clone()).or_default().push(marker);
        self.changed(resource);
        Ok(())
    }

    fn delete(&self, resource: &FileId, kinds: &[MarkerKind]) -> Result<usize, MarkerError> {
        let removed = {
            let mut markers = self.write();
            let Some(existing) = markers.get_mut(resource) else {
                return Ok(0);
            };
            let before = existing.len();
            existing.retain(|marker| !kinds.contains(&marker.kind));
            let removed = before - existing.len();
            if existing.is_empty() {
                markers.remove(resource);
            }
            removed
        };
        if removed > 0 {
            self.changed(resource);
        }
        Ok(removed)
    }

    fn markers(&self, resource: &FileId) -> Vec<Marker> {
        self.read().get(resource).cloned().unwrap_or_default()
    }

    fn begin_batch(&self) {
        self.batch_state().depth += 1;
    }

    fn end_batch(&self) {
        let mut state = self.batch_state();
        state.depth = state.depth.saturating_sub(1);
        if state.depth > 0 || state.pending.is_empty() {
            return;
        }
        let flushed: Vec<FileId> = std::mem::take(&mut state.pending).into_iter().collect();
        drop(state);
        self.notify(&flushed);
    }
}

impl fmt::Debug for InMemoryMarkerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMarkerStore")
            .field("markers", &self.markers)
            .field("batch", &self.batch)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
