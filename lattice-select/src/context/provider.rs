//! Provider
//!
//! A Provider is the boundary between the host and the mechanism. It owns
//! one source for the whole time it is mounted, and on every commit it
//! writes the new value and notifies every listener before handing control
//! back to the host.
//!
//! # Ordering
//!
//! `commit` returns only after every selector subscription watching this
//! provider has re-run its selector against the new value. No reader can
//! read between the write and the notification.
//!
//! # Identity
//!
//! The source handle is created once, at mount. Every commit writes into
//! the same cell, so hosts that track sources by identity see one source
//! for the lifetime of the mount.

use std::fmt::{self, Debug};

use super::scope::ProviderScope;
use super::Context;
use crate::config::NotifyConfig;
use crate::source::{SourceHandle, Version};

/// A mounted provider for one context.
///
/// # Example
///
/// ```rust
/// use lattice_select::{create_context, use_context_selector, Provider};
///
/// let theme = create_context("light");
/// let provider = Provider::mount(&theme, "dark");
///
/// let inside = provider.provide(|| use_context_selector(&theme, |t| **t))?;
/// let outside = use_context_selector(&theme, |t| **t)?;
///
/// assert_eq!(inside, "dark");
/// assert_eq!(outside, "light");
/// # Ok::<(), lattice_select::Error>(())
/// ```
pub struct Provider<V> {
    context: Context<V>,
    source: SourceHandle<V>,
}

impl<V> Provider<V>
where
    V: Send + Sync + 'static,
{
    /// Mount a provider for `context`, seeded with `value`.
    ///
    /// The provider inherits the config the context was created with.
    pub fn mount(context: &Context<V>, value: V) -> Self {
        Self::mount_with(context, value, context.config())
    }

    /// Mount a provider with an explicit config.
    pub fn mount_with(context: &Context<V>, value: V, config: NotifyConfig) -> Self {
        let source = SourceHandle::new(value, config);
        tracing::debug!(context = %context.id(), source = source.id().raw(), "provider mounted");

        Self {
            context: context.clone(),
            source,
        }
    }

    /// The context this provider overrides.
    pub fn context(&self) -> &Context<V> {
        &self.context
    }

    /// The provider's source. The same handle for the whole mount.
    pub fn source(&self) -> &SourceHandle<V> {
        &self.source
    }

    /// Publish a new value.
    ///
    /// Every listener has been notified by the time this returns.
    pub fn commit(&self, value: V) -> Version {
        let version = self.source.commit(value);
        tracing::trace!(context = %self.context.id(), %version, "provider committed");
        version
    }

    /// Run `children` with this provider in scope.
    ///
    /// Reads of this provider's context inside `children` resolve to it,
    /// unless a nested provider for the same context takes over.
    pub fn provide<R, F>(&self, children: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _scope = self.scope();
        children()
    }

    /// Commit `value`, then run `children` with this provider in scope.
    pub fn render<R, F>(&self, value: V, children: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.commit(value);
        self.provide(children)
    }

    /// Put this provider in scope until the returned guard is dropped.
    pub fn scope(&self) -> ProviderScope<'_> {
        ProviderScope::enter(self.context.id(), &self.source)
    }
}

impl<V> Debug for Provider<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("context", &self.context.id())
            .field("source", &self.source.id())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
