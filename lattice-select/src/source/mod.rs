//! Versioned Sources
//!
//! This module implements the shared state side of the mechanism: a
//! [`VersionedCell`] holding the current value and its [`Version`], the
//! [`ListenerRegistry`] that is notified synchronously on every write, and
//! the [`SourceHandle`] readers and hosts use to address a cell.
//!
//! # Versions
//!
//! Every write bumps the cell's version. A host that pauses in the middle of
//! a traversal can compare the version it rendered with against
//! [`SourceHandle::version`] to find out whether it must re-derive.

mod cell;
mod handle;
mod listener;
mod version;

pub use cell::VersionedCell;
pub use handle::{SourceHandle, SourceId};
pub use listener::{Listener, ListenerId, ListenerRegistry};
pub use version::Version;
