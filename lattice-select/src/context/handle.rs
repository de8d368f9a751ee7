//! Context Handle
//!
//! The handle is the shared state behind every clone of a [`Context`]: the
//! context's identity, the config inherited by its providers, and the slot
//! holding its default source.
//!
//! The slot starts filled and can be emptied with [`Context::release`].
//! Reads that fall back to an empty slot fail with
//! [`Error::MissingSource`](crate::Error::MissingSource).
//!
//! [`Context`]: super::Context
//! [`Context::release`]: super::Context::release

use parking_lot::RwLock;

use super::ContextId;
use crate::config::NotifyConfig;
use crate::source::SourceHandle;

/// Shared state of one context.
pub(crate) struct ContextHandle<V> {
    pub(crate) id: ContextId,

    /// Config inherited by providers mounted without an explicit one.
    pub(crate) config: NotifyConfig,

    /// Source used when no provider is in scope. `None` once released.
    default: RwLock<Option<SourceHandle<V>>>,
}

impl<V> ContextHandle<V>
where
    V: Send + Sync + 'static,
{
    pub(crate) fn new(default: V, config: NotifyConfig) -> Self {
        let id = ContextId::new();
        let value_type = std::any::type_name::<V>();
        tracing::debug!(context = %id, value_type, "context created");

        Self {
            id,
            config,
            default: RwLock::new(Some(SourceHandle::new(default, config))),
        }
    }

    /// The default source, if the slot has not been emptied.
    pub(crate) fn default_source(&self) -> Option<SourceHandle<V>> {
        self.default.read().clone()
    }

    /// Empty the default slot. Returns `false` if it was already empty.
    pub(crate) fn release(&self) -> bool {
        let released = self.default.write().take().is_some();
        if released {
            tracing::debug!(context = %self.id, "context released");
        }
        released
    }
}

impl<V> Drop for ContextHandle<V> {
    fn drop(&mut self) {
        tracing::trace!(context = %self.id, "context dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_holds_default_until_released() {
        let handle = ContextHandle::new(5u32, NotifyConfig::default());
        let source = handle.default_source().expect("filled");
        assert_eq!(*source.value(), 5);

        assert!(handle.release());
        assert!(!handle.release());
        assert!(handle.default_source().is_none());
    }

    #[test]
    fn default_source_is_stable() {
        let handle = ContextHandle::new("x", NotifyConfig::default());
        let a = handle.default_source().expect("filled");
        let b = handle.default_source().expect("filled");
        assert!(a.same_source(&b));
    }

    #[test]
    fn config_is_kept_with_the_handle() {
        let handle = ContextHandle::new(0i32, NotifyConfig::contain_panics());
        assert_eq!(handle.config, NotifyConfig::contain_panics());
    }
}
