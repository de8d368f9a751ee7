//! Versioned Cell
//!
//! A VersionedCell is the unit of truth for one provided value. It holds the
//! current value together with its version, and the registry of listeners
//! watching it.
//!
//! # Write Ordering
//!
//! `set` does two things, always in this order and always before returning:
//!
//! 1. Replace the value and bump the version under a single write lock.
//! 2. Release the lock and call every registered listener.
//!
//! Readers therefore never see a value without its matching version, and by
//! the time `set` returns every listener has already looked at the new value.
//! There is no batching at this layer.
//!
//! # Thread Safety
//!
//! The slot is guarded by a `parking_lot::RwLock`. In the expected
//! single-writer setup the lock is uncontended; on a host that reads from
//! several threads it is the barrier that makes a write visible before any
//! listener runs.

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::RwLock;

use super::listener::ListenerRegistry;
use super::version::Version;
use crate::config::NotifyConfig;

/// The value and version, always replaced together.
struct Slot<V> {
    value: Arc<V>,
    version: Version,
}

/// A value plus its change-notification mechanism.
///
/// # Example
///
/// ```rust
/// use lattice_select::VersionedCell;
///
/// let cell = VersionedCell::new(1);
/// let before = cell.version();
///
/// cell.set(2);
/// assert_eq!(*cell.get(), 2);
/// assert_ne!(cell.version(), before);
/// ```
pub struct VersionedCell<V> {
    slot: RwLock<Slot<V>>,
    listeners: ListenerRegistry,
}

impl<V> VersionedCell<V>
where
    V: Send + Sync + 'static,
{
    /// Create a new cell seeded with `value` at [`Version::INITIAL`].
    pub fn new(value: V) -> Self {
        Self::with_config(value, NotifyConfig::default())
    }

    /// Create a new cell whose listener registry uses `config`.
    pub fn with_config(value: V, config: NotifyConfig) -> Self {
        Self::from_arc(Arc::new(value), config)
    }

    /// Create a new cell around an already shared value.
    pub fn from_arc(value: Arc<V>, config: NotifyConfig) -> Self {
        Self {
            slot: RwLock::new(Slot {
                value,
                version: Version::INITIAL,
            }),
            listeners: ListenerRegistry::with_config(config),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> Arc<V> {
        Arc::clone(&self.slot.read().value)
    }

    /// Get the current version.
    pub fn version(&self) -> Version {
        self.slot.read().version
    }

    /// Get the current version and value as one consistent pair.
    pub fn read(&self) -> (Version, Arc<V>) {
        let slot = self.slot.read();
        (slot.version, Arc::clone(&slot.value))
    }

    /// Replace the value and notify every listener before returning.
    pub fn set(&self, value: V) -> Version {
        self.set_arc(Arc::new(value))
    }

    /// Replace the value with an already shared one.
    ///
    /// Passing the same `Arc` again still bumps the version and notifies;
    /// identity-comparing listeners will simply see no change.
    pub fn set_arc(&self, value: Arc<V>) -> Version {
        let version = {
            let mut slot = self.slot.write();
            slot.version = slot.version.next();
            slot.value = value;
            slot.version
        };

        let notified = self.listeners.notify_all();
        tracing::trace!(%version, notified, "cell updated");

        version
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F) -> Version
    where
        F: FnOnce(&V) -> V,
    {
        let current = self.get();
        self.set(f(&current))
    }

    /// The listeners watching this cell.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }
}

impl<V> Debug for VersionedCell<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read();
        f.debug_struct("VersionedCell")
            .field("version", &slot.version)
            .field("value", &slot.value)
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
