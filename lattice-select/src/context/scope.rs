//! Provider Scope Stack
//!
//! The scope stack records which providers enclose the code that is running
//! right now. Mounting a provider's children pushes an entry; leaving them
//! removes it. A read resolves a context by walking the stack from the top,
//! so the innermost provider wins.
//!
//! # Implementation
//!
//! Each thread has its own stack, the same way a host renders one tree on
//! one thread at a time. Entries are removed by a guard that borrows the
//! provider, so a scope can never outlive the provider it names. The guard
//! removes its own entry (the topmost one with its context and source), not
//! whatever happens to be on top, so dropping guards out of order leaves
//! the other providers in place.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use super::ContextId;
use crate::source::{SourceHandle, SourceId};

thread_local! {
    static SCOPE_STACK: RefCell<Vec<ScopeEntry>> = const { RefCell::new(Vec::new()) };
}

/// An entry in the scope stack.
struct ScopeEntry {
    context: ContextId,
    source: SourceId,
    /// The provider's `SourceHandle<V>`, type-erased.
    handle: Arc<dyn Any + Send + Sync>,
}

/// Guard that keeps a provider in scope until dropped.
///
/// Created by [`Provider::scope`](super::Provider::scope).
#[must_use = "the provider leaves scope as soon as the guard is dropped"]
pub struct ProviderScope<'a> {
    context: ContextId,
    source: SourceId,
    // Borrows the provider, and stays on the thread whose stack it pushed onto.
    _marker: PhantomData<(&'a (), *const ())>,
}

impl<'a> ProviderScope<'a> {
    pub(crate) fn enter<V>(context: ContextId, handle: &'a SourceHandle<V>) -> Self
    where
        V: Send + Sync + 'static,
    {
        let source = handle.id();
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(ScopeEntry {
                context,
                source,
                handle: Arc::new(handle.clone()),
            });
        });

        Self {
            context,
            source,
            _marker: PhantomData,
        }
    }

    /// The context this guard provides.
    pub fn context(&self) -> ContextId {
        self.context
    }
}

impl Drop for ProviderScope<'_> {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let position = stack
                .iter()
                .rposition(|entry| entry.context == self.context && entry.source == self.source);

            match position {
                Some(index) => {
                    if index + 1 != stack.len() {
                        tracing::debug!(
                            context = %self.context,
                            source = self.source.raw(),
                            "provider scope left out of order"
                        );
                    }
                    stack.remove(index);
                }
                None => {
                    tracing::warn!(
                        context = %self.context,
                        source = self.source.raw(),
                        "provider scope missing from stack"
                    );
                }
            }
        });
    }
}

/// Find the innermost provider for `context` on this thread.
pub(crate) fn nearest<V>(context: ContextId) -> Option<SourceHandle<V>>
where
    V: Send + Sync + 'static,
{
    SCOPE_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .filter(|entry| entry.context == context)
            .find_map(|entry| entry.handle.downcast_ref::<SourceHandle<V>>().cloned())
    })
}

/// Number of providers currently in scope on this thread.
#[cfg(test)]
pub(crate) fn depth() -> usize {
    SCOPE_STACK.with(|stack| stack.borrow().len())
}
