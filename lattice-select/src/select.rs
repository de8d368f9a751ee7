//! Context Selection API
//!
//! The entry points readers use. All of them resolve the context first
//! (innermost provider on this thread, else the context's default source)
//! and fail with [`Error::MissingSource`](crate::Error::MissingSource) if
//! nothing resolves.
//!
//! - [`create_context`] creates a context and its default value.
//! - [`use_context_selector`] returns the selected value right now.
//! - [`use_context`] returns the whole value.
//! - [`select`] returns the subscription a mounted reader keeps, so it can
//!   watch for changes and re-read through the host's consistency checks.
//!
//! For good performance keep selectors stable across renders. Correctness
//! does not depend on it.

use std::sync::Arc;

use crate::config::NotifyConfig;
use crate::context::Context;
use crate::error::Result;
use crate::identity::Identical;
use crate::selector::SelectorSubscription;
use crate::source::SourceHandle;

/// Create a context whose default source holds `default`.
///
/// # Example
///
/// ```rust
/// use lattice_select::{create_context, use_context_selector};
///
/// struct Person {
///     first_name: String,
///     family_name: String,
/// }
///
/// let person = create_context(Person {
///     first_name: "Ada".into(),
///     family_name: "Lovelace".into(),
/// });
///
/// let first = use_context_selector(&person, |p| p.first_name.clone())?;
/// assert_eq!(first, "Ada");
/// # Ok::<(), lattice_select::Error>(())
/// ```
pub fn create_context<V>(default: V) -> Context<V>
where
    V: Send + Sync + 'static,
{
    create_context_with(default, NotifyConfig::default())
}

/// Create a context with an explicit notification config.
///
/// Providers mounted with [`Provider::mount`](crate::Provider::mount)
/// inherit `config`.
pub fn create_context_with<V>(default: V, config: NotifyConfig) -> Context<V>
where
    V: Send + Sync + 'static,
{
    Context::new(default, config)
}

/// Resolve the source a read of `context` would use at this point.
pub fn resolve<V>(context: &Context<V>) -> Result<SourceHandle<V>>
where
    V: Send + Sync + 'static,
{
    context.resolve()
}

/// Bind `selector` to the resolved source of `context`.
pub fn select<V, S, F>(context: &Context<V>, selector: F) -> Result<SelectorSubscription<V, S>>
where
    V: Send + Sync + 'static,
    S: Identical + Send + 'static,
    F: Fn(&Arc<V>) -> S + Send + Sync + 'static,
{
    let source = context.resolve()?;
    Ok(SelectorSubscription::new(source, selector))
}

/// Read the value `selector` picks out of `context`.
pub fn use_context_selector<V, S, F>(context: &Context<V>, selector: F) -> Result<S>
where
    V: Send + Sync + 'static,
    S: Identical + Send + 'static,
    F: Fn(&Arc<V>) -> S + Send + Sync + 'static,
{
    Ok(select(context, selector)?.get_snapshot())
}

/// Read the whole value of `context`.
///
/// The result is the shared value itself; it compares by pointer identity.
pub fn use_context<V>(context: &Context<V>) -> Result<Arc<V>>
where
    V: Send + Sync + 'static,
{
    use_context_selector(context, Arc::clone)
}
