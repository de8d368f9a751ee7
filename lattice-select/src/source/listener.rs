//! Listener Registry
//!
//! A registry holds the change listeners attached to one cell. Listeners are
//! plain callbacks with no arguments; they read whatever they need from the
//! cell themselves.
//!
//! # Re-entrancy
//!
//! `notify_all` copies the current listeners out of the lock before calling
//! any of them. A listener may therefore add or remove listeners (itself
//! included) while a notification is in flight. Such changes show up on the
//! next `notify_all`, never in the current one.
//!
//! # Panics
//!
//! Every listener runs under `catch_unwind`. One listener panicking never
//! stops the others and never touches the registry contents; what happens
//! after the round is decided by [`ListenerPanicPolicy`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::config::{ListenerPanicPolicy, NotifyConfig};

/// A change listener.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Unique identifier for a registered listener.
///
/// Ids are never reused, so removing a stale id is always a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// The set of listeners attached to one cell.
pub struct ListenerRegistry {
    /// Registered listeners in registration order.
    listeners: RwLock<IndexMap<ListenerId, Listener>>,

    config: NotifyConfig,
}

impl ListenerRegistry {
    /// Create an empty registry with the default config.
    pub fn new() -> Self {
        Self::with_config(NotifyConfig::default())
    }

    /// Create an empty registry.
    pub fn with_config(config: NotifyConfig) -> Self {
        Self {
            listeners: RwLock::new(IndexMap::new()),
            config,
        }
    }

    /// Register a listener.
    pub fn add<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.listeners.write().insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener.
    ///
    /// Returns `false` if the id was not registered (already removed, or
    /// from another registry).
    pub fn remove(&self, id: ListenerId) -> bool {
        // shift_remove keeps the remaining listeners in registration order
        self.listeners.write().shift_remove(&id).is_some()
    }

    /// Check whether a listener is registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.read().contains_key(&id)
    }

    /// Get the number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Check whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// The config this registry was built with.
    pub fn config(&self) -> NotifyConfig {
        self.config
    }

    /// Invoke every currently registered listener once.
    ///
    /// Returns the number of listeners invoked. With
    /// [`ListenerPanicPolicy::Propagate`] the first panic is resumed after
    /// the whole round has run.
    pub fn notify_all(&self) -> usize {
        let snapshot: SmallVec<[(ListenerId, Listener); 8]> = self
            .listeners
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut first_panic: Option<Box<dyn Any + Send>> = None;

        for (id, listener) in snapshot.iter() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                tracing::error!(
                    listener = %id,
                    panic = panic_message(payload.as_ref()),
                    "listener panicked during notification"
                );
                if first_panic.is_none() {
                    first_panic = Some(payload);
                }
            }
        }

        if let Some(payload) = first_panic {
            if self.config.panic_policy == ListenerPanicPolicy::Propagate {
                panic::resume_unwind(payload);
            }
        }

        snapshot.len()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
