//! Source Handle
//!
//! A SourceHandle is the shared-ownership handle to one VersionedCell. It is
//! what a host's consistency protocol talks to (`version`, `read`), and what
//! selector subscriptions are built against.
//!
//! A handle is created once per cell and cloned from there on. Clones share
//! the same [`SourceId`], so hosts that track sources by identity see one
//! stable source for the whole lifetime of a provider mount.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::cell::VersionedCell;
use super::listener::ListenerId;
use super::version::Version;
use crate::config::NotifyConfig;

/// Unique identifier for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Shared handle to a [`VersionedCell`].
pub struct SourceHandle<V> {
    id: SourceId,
    cell: Arc<VersionedCell<V>>,
}

impl<V> SourceHandle<V> {
    /// Get the source's unique ID.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Check whether two handles address the same cell.
    pub fn same_source(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<V> SourceHandle<V>
where
    V: Send + Sync + 'static,
{
    /// Create a handle around a new cell.
    pub fn new(value: V, config: NotifyConfig) -> Self {
        Self::from_cell(VersionedCell::with_config(value, config))
    }

    /// Wrap an existing cell.
    pub fn from_cell(cell: VersionedCell<V>) -> Self {
        Self {
            id: SourceId::new(),
            cell: Arc::new(cell),
        }
    }

    /// Get the current version. Cheap enough to call on every render.
    pub fn version(&self) -> Version {
        self.cell.version()
    }

    /// Get the current value.
    pub fn value(&self) -> Arc<V> {
        self.cell.get()
    }

    /// Get the current version and value as one consistent pair.
    pub fn read(&self) -> (Version, Arc<V>) {
        self.cell.read()
    }

    /// The underlying cell.
    pub(crate) fn cell(&self) -> &VersionedCell<V> {
        &self.cell
    }

    /// Get the number of listeners currently attached.
    pub fn listener_count(&self) -> usize {
        self.cell.listeners().len()
    }

    /// Register a listener on the underlying cell.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.cell.listeners().add(listener)
    }

    /// Remove a listener from the underlying cell.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.cell.listeners().remove(id)
    }

    /// A non-owning reference, for listeners that live inside the cell.
    pub(crate) fn downgrade(&self) -> WeakSource<V> {
        WeakSource {
            id: self.id,
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Publish a new value. Only the owning provider (or tests) write.
    pub(crate) fn commit(&self, value: V) -> Version {
        self.cell.set(value)
    }
}

impl<V> Clone for SourceHandle<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<V> Debug for SourceHandle<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("id", &self.id)
            .field("cell", &self.cell)
            .finish()
    }
}

/// Weak counterpart of [`SourceHandle`].
pub(crate) struct WeakSource<V> {
    id: SourceId,
    cell: Weak<VersionedCell<V>>,
}

impl<V> WeakSource<V> {
    pub(crate) fn upgrade(&self) -> Option<SourceHandle<V>> {
        self.cell.upgrade().map(|cell| SourceHandle { id: self.id, cell })
    }
}
