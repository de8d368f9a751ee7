//! Lattice Select
//!
//! This crate provides selector-scoped subscriptions over a versioned shared
//! value, the context layer of the Lattice reactive UI framework.
//! It implements:
//!
//! - Versioned cells with synchronous, ordered change notification
//! - Selector subscriptions that only wake a reader when its selection changes
//! - Contexts with default values and nested providers
//! - Version tokens for tear-free reads across interrupted traversals
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `source`: Versioned cells, listener registries and source handles
//! - `selector`: Selector subscriptions and snapshots
//! - `context`: Contexts, provider scopes and providers
//! - `select`: The public entry points (`create_context`, `use_context_selector`, ...)
//! - `identity`: The identity equality used for change detection
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use lattice_select::{create_context, Provider};
//!
//! struct State {
//!     a: i32,
//!     b: i32,
//! }
//!
//! let ctx = create_context(State { a: 1, b: 2 });
//! let provider = Provider::mount(&ctx, State { a: 1, b: 2 });
//!
//! // A reader interested only in `a`.
//! let reader = provider.provide(|| lattice_select::select(&ctx, |s| s.a))?;
//! let renders = Arc::new(AtomicUsize::new(0));
//! let renders_clone = renders.clone();
//! let _guard = reader.subscribe(move || {
//!     renders_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! // Changing `b` leaves the reader alone.
//! provider.commit(State { a: 1, b: 3 });
//! assert_eq!(renders.load(Ordering::SeqCst), 0);
//!
//! // Changing `a` wakes it exactly once.
//! provider.commit(State { a: 2, b: 3 });
//! assert_eq!(renders.load(Ordering::SeqCst), 1);
//! assert_eq!(reader.get_snapshot(), 2);
//! # Ok::<(), lattice_select::Error>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod select;
pub mod selector;
pub mod source;

pub use config::{ListenerPanicPolicy, NotifyConfig};
pub use context::{Context, ContextId, Provider, ProviderScope};
pub use error::{Error, Result};
pub use identity::Identical;
pub use select::{
    create_context, create_context_with, resolve, select, use_context, use_context_selector,
};
pub use selector::{SelectorSubscription, Snapshot, Unsubscribe};
pub use source::{ListenerId, ListenerRegistry, SourceHandle, SourceId, Version, VersionedCell};
