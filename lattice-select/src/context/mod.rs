//! Contexts and Providers
//!
//! A context is a logical slot that readers select from. Each context owns
//! a default source, created together with the context, and may be
//! overridden for a region of the tree by mounting a [`Provider`].
//!
//! # Resolution
//!
//! Reading a context resolves its source in this order:
//!
//! 1. The innermost provider for this context on the current thread's scope
//!    stack (see [`ProviderScope`]).
//! 2. The context's default source.
//!
//! If neither exists the read fails with [`Error::MissingSource`]. That only
//! happens for a context whose default has been released.
//!
//! # No Direct Reads
//!
//! [`Context`] has no way to read the value on its own; every read goes
//! through a selector, so nothing can subscribe to the whole value by
//! accident.
//!
//! # Ownership
//!
//! Clones of a context share one handle. The default value is dropped when
//! the last clone (and the last provider or subscription using it) goes
//! away; there is no global table keeping it alive.

mod handle;
mod provider;
mod scope;

pub use provider::Provider;
pub use scope::ProviderScope;

use std::fmt;
use std::sync::Arc;

use self::handle::ContextHandle;
use crate::config::NotifyConfig;
use crate::error::{Error, Result};
use crate::source::SourceHandle;

/// Unique identifier for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Generate a new unique context ID.
    pub(crate) fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ContextId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A context created by `create_context`.
pub struct Context<V> {
    handle: Arc<ContextHandle<V>>,
}

impl<V> Context<V> {
    /// Get the context's unique ID.
    pub fn id(&self) -> ContextId {
        self.handle.id
    }

    /// The config providers of this context inherit.
    pub fn config(&self) -> NotifyConfig {
        self.handle.config
    }
}

impl<V> Context<V>
where
    V: Send + Sync + 'static,
{
    pub(crate) fn new(default: V, config: NotifyConfig) -> Self {
        Self {
            handle: Arc::new(ContextHandle::new(default, config)),
        }
    }

    /// Check whether the default source has been released.
    pub fn is_released(&self) -> bool {
        self.handle.default_source().is_none()
    }

    /// Drop the default source, for this context and all its clones.
    ///
    /// Mounted providers keep working; reads that fall back to the default
    /// fail with [`Error::MissingSource`] from now on. Returns `false` if
    /// the default was already released.
    pub fn release(&self) -> bool {
        self.handle.release()
    }

    /// Resolve the source a read at this point would use.
    pub(crate) fn resolve(&self) -> Result<SourceHandle<V>> {
        scope::nearest::<V>(self.id())
            .or_else(|| self.handle.default_source())
            .ok_or(Error::MissingSource { context: self.id() })
    }
}

impl<V> Clone for Context<V> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<V> PartialEq for Context<V> {
    fn eq(&self, other: &Self) -> bool {
        self.handle.id == other.handle.id
    }
}

impl<V> Eq for Context<V> {}

impl<V> fmt::Debug for Context<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.handle.id)
            .field("value_type", &std::any::type_name::<V>())
            .finish()
    }
}
