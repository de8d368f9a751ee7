//! Notification configuration.
//!
//! There is no configuration file: these are plain values handed to the
//! constructors that create listener registries (`VersionedCell::with_config`,
//! `create_context_with`, `Provider::mount_with`).

/// What a registry does after a listener panics during `notify_all`.
///
/// Every remaining listener still runs in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerPanicPolicy {
    /// Resume the first panic once every listener has run.
    #[default]
    Propagate,

    /// Log the panic with `tracing::error!` and return normally.
    Log,
}

/// Configuration for a listener registry and the cell that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotifyConfig {
    /// Behavior after a listener panics.
    pub panic_policy: ListenerPanicPolicy,
}

impl NotifyConfig {
    /// Config that contains listener panics instead of resuming them.
    pub fn contain_panics() -> Self {
        Self {
            panic_policy: ListenerPanicPolicy::Log,
        }
    }
}
