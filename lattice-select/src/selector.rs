//! Selector Subscriptions
//!
//! A SelectorSubscription binds a pure projection function (the selector) to
//! a source. It is the piece a reader talks to:
//!
//! - [`get_snapshot`](SelectorSubscription::get_snapshot) derives the
//!   selected value from the source's current value, every time it is
//!   called. Nothing is cached across calls, so a host that pauses and
//!   restarts a traversal always derives from what the source holds now.
//!
//! - [`subscribe`](SelectorSubscription::subscribe) registers a listener on
//!   the source. On every notification the listener re-runs the selector and
//!   compares the result with the value it saw last. Only when the two are
//!   not [`Identical`] does it update its cache and call the reader back.
//!
//! # Change Detection
//!
//! A reader interested only in one field of a large value should not wake up
//! when some other field changes. Comparing the selected value rather than
//! the raw value gives exactly that. A value that round-trips back to an
//! earlier selection is compared against the last one seen, so it fires only
//! if it differs from that.
//!
//! # Purity
//!
//! Selectors must be pure: the same input must give an identical output.
//! This is a contract, not something the subscription can check. A selector
//! that panics unwinds into whoever asked for the snapshot.

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::identity::Identical;
use crate::source::{ListenerId, SourceHandle, SourceId, Version};

/// A selected value together with the version it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<S> {
    /// Version of the source value the selector ran against.
    pub version: Version,
    /// The selector's output.
    pub selected: S,
}

/// A selector bound to a source.
///
/// # Example
///
/// ```rust,ignore
/// let todos = create_context(TodoState::default());
/// let done = select(&todos, |state| state.done_count)?;
///
/// let _guard = done.subscribe(|| schedule_render());
/// let count = done.get_snapshot();
/// ```
pub struct SelectorSubscription<V, S> {
    source: SourceHandle<V>,

    selector: Arc<dyn Fn(&Arc<V>) -> S + Send + Sync>,
}

impl<V, S> SelectorSubscription<V, S>
where
    V: Send + Sync + 'static,
    S: Identical + Send + 'static,
{
    /// Bind `selector` to `source`.
    pub fn new<F>(source: SourceHandle<V>, selector: F) -> Self
    where
        F: Fn(&Arc<V>) -> S + Send + Sync + 'static,
    {
        Self {
            source,
            selector: Arc::new(selector),
        }
    }

    /// The source this subscription reads from.
    pub fn source(&self) -> &SourceHandle<V> {
        &self.source
    }

    /// Derive the selected value from the source's current value.
    ///
    /// Calling this repeatedly without an intervening commit returns
    /// identical results.
    pub fn get_snapshot(&self) -> S {
        (self.selector)(&self.source.value())
    }

    /// Derive the selected value together with the version it came from.
    ///
    /// Version and value are read as one pair, so the snapshot always
    /// reflects exactly one commit.
    pub fn read(&self) -> Snapshot<S> {
        let (version, value) = self.source.read();
        Snapshot {
            version,
            selected: (self.selector)(&value),
        }
    }

    /// Check whether a snapshot still matches the source's current version.
    pub fn is_current(&self, snapshot: &Snapshot<S>) -> bool {
        snapshot.version == self.source.version()
    }

    /// Watch the selected value.
    ///
    /// `callback` runs synchronously from within the commit that changed the
    /// selection, at most once per commit. Dropping the returned guard
    /// unsubscribes, so the guard must be kept for as long as the reader
    /// wants to hear about changes.
    #[must_use = "dropping the guard unsubscribes immediately"]
    pub fn subscribe<C>(&self, callback: C) -> Unsubscribe
    where
        C: Fn() + Send + Sync + 'static,
    {
        let last_selected = Mutex::new(self.get_snapshot());
        let selector = Arc::clone(&self.selector);
        let weak = self.source.downgrade();

        let listener = self.source.add_listener(move || {
            let Some(source) = weak.upgrade() else {
                return;
            };
            let next = selector(&source.value());

            let changed = {
                let mut last = last_selected.lock();
                if last.identical(&next) {
                    false
                } else {
                    *last = next;
                    true
                }
            };

            // Called outside the cache lock so the callback may read again.
            if changed {
                callback();
            }
        });

        tracing::debug!(source = self.source.id().raw(), %listener, "selector subscribed");

        let weak = self.source.downgrade();
        Unsubscribe {
            source: self.source.id(),
            listener,
            remove: Mutex::new(Some(Box::new(move || {
                weak.upgrade()
                    .map(|source| source.remove_listener(listener))
                    .unwrap_or(false)
            }))),
        }
    }
}

impl<V, S> Clone for SelectorSubscription<V, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<V, S> Debug for SelectorSubscription<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorSubscription")
            .field("source", &self.source.id())
            .finish_non_exhaustive()
    }
}

/// Guard returned by [`SelectorSubscription::subscribe`].
///
/// Unsubscribing is idempotent. Dropping the guard unsubscribes, so a reader
/// torn down without explicit cleanup does not leave its listener behind.
/// `std::mem::forget` on the guard keeps the listener registered for the
/// life of the source.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct Unsubscribe {
    source: SourceId,
    listener: ListenerId,
    remove: Mutex<Option<Box<dyn FnOnce() -> bool + Send>>>,
}

impl Unsubscribe {
    /// Remove the listener from its source.
    ///
    /// Returns `true` only for the call that actually removed it.
    pub fn unsubscribe(&self) -> bool {
        let remove = self.remove.lock().take();
        match remove {
            Some(remove) => {
                let removed = remove();
                tracing::debug!(
                    source = self.source.raw(),
                    listener = %self.listener,
                    removed,
                    "selector unsubscribed"
                );
                removed
            }
            None => false,
        }
    }

    /// Check whether this guard has not been unsubscribed yet.
    pub fn is_active(&self) -> bool {
        self.remove.lock().is_some()
    }

    /// The listener this guard owns.
    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("source", &self.source)
            .field("listener", &self.listener)
            .field("active", &self.is_active())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
