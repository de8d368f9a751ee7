//! Integration Tests for Context Selection
//!
//! These tests verify that contexts, providers and selector subscriptions
//! work together correctly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use lattice_select::{
    create_context, create_context_with, select, use_context, use_context_selector, Error,
    NotifyConfig, Provider, Version,
};

#[derive(Debug, Clone, PartialEq)]
struct Record {
    a: i32,
    b: i32,
}

fn record(a: i32, b: i32) -> Record {
    Record { a, b }
}

fn counter() -> (Arc<AtomicI32>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicI32::new(0));
    let count_clone = count.clone();
    (count, move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    })
}

/// Repeated snapshots without a commit in between are identical.
#[test]
fn snapshots_are_idempotent_between_commits() {
    let ctx = create_context(record(1, 2));
    let provider = Provider::mount(&ctx, record(4, 5));
    let reader = provider
        .provide(|| select(&ctx, |r| r.a * 10 + r.b))
        .expect("resolves");

    let first = reader.read();
    let second = reader.read();
    assert_eq!(first, second);
    assert_eq!(reader.get_snapshot(), 45);
    assert_eq!(reader.get_snapshot(), 45);
}

/// The full scenario: only `a` is selected, so changing `b` alone is silent.
#[test]
fn end_to_end_only_selected_changes_notify() {
    let ctx = create_context(record(1, 2));
    let provider = Provider::mount(&ctx, record(1, 2));

    let reader = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");
    let (count, callback) = counter();
    let _guard = reader.subscribe(callback);

    provider.render(record(1, 3), || ());
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(reader.get_snapshot(), 1);

    provider.render(record(2, 3), || ());
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(reader.get_snapshot(), 2);
}

/// Every subscriber with a changed selection hears about it exactly once.
#[test]
fn every_subscriber_is_notified_once() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));

    let mut counts = Vec::new();
    let mut guards = Vec::new();
    for _ in 0..5 {
        let reader = provider.provide(|| select(&ctx, |r| r.b)).expect("resolves");
        let (count, callback) = counter();
        guards.push(reader.subscribe(callback));
        counts.push(count);
    }
    let untouched = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");
    let (untouched_count, callback) = counter();
    guards.push(untouched.subscribe(callback));

    provider.commit(record(0, 1));

    for count in &counts {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
    assert_eq!(untouched_count.load(Ordering::SeqCst), 0);
}

/// After unsubscribing no commit reaches the callback.
#[test]
fn unsubscribed_reader_stays_quiet() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");
    let (count, callback) = counter();

    let guard = reader.subscribe(callback);
    provider.commit(record(1, 0));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    guard.unsubscribe();
    guard.unsubscribe();
    provider.commit(record(2, 0));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(provider.source().listener_count(), 0);
}

/// A reader that detaches from inside its own callback does not disturb the
/// commit in progress.
#[test]
fn reader_may_detach_during_notification() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");

    let slot: Arc<Mutex<Option<lattice_select::Unsubscribe>>> = Arc::default();
    let slot_clone = slot.clone();
    let (count, bump) = counter();
    let guard = reader.subscribe(move || {
        bump();
        if let Some(guard) = slot_clone.lock().take() {
            guard.unsubscribe();
        }
    });
    *slot.lock() = Some(guard);

    let (other_count, other) = counter();
    let _other = reader.subscribe(other);

    provider.commit(record(1, 0));
    provider.commit(record(2, 0));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(other_count.load(Ordering::SeqCst), 2);
}

/// Every snapshot corresponds to exactly one commit, never a mix.
#[test]
fn snapshots_never_tear() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider
        .provide(|| select(&ctx, |r| (r.a, r.b)))
        .expect("resolves");

    let mut committed: HashMap<Version, (i32, i32)> = HashMap::new();
    committed.insert(provider.source().version(), (0, 0));

    let mut observed = Vec::new();
    for step in 1..=20 {
        observed.push(reader.read());
        let version = provider.commit(record(step, -step));
        committed.insert(version, (step, -step));
        observed.push(reader.read());
    }

    for snapshot in observed {
        assert_eq!(committed.get(&snapshot.version), Some(&snapshot.selected));
    }
}

/// Readers on other threads never see a half-applied value.
#[test]
fn concurrent_readers_never_tear() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider
        .provide(|| select(&ctx, |r| (r.a, r.b)))
        .expect("resolves");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let reader = reader.clone();
            scope.spawn(move || {
                for _ in 0..1_000 {
                    let snapshot = reader.read();
                    let (a, b) = snapshot.selected;
                    assert_eq!(a, b);
                    assert_eq!(a as u64, snapshot.version.raw());
                }
            });
        }

        for n in 1..=1_000 {
            provider.commit(record(n, n));
        }
    });
}

/// A host that paused mid-traversal can tell its snapshot went stale.
#[test]
fn stale_snapshot_is_detected_after_pause() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");

    let before_pause = reader.read();
    provider.commit(record(3, 0));

    assert!(!reader.is_current(&before_pause));
    let after_pause = reader.read();
    assert!(reader.is_current(&after_pause));
    assert_eq!(after_pause.selected, 3);
}

/// Without a provider, reads use the default value.
#[test]
fn default_value_without_provider() {
    let ctx = create_context(record(7, 8));
    assert_eq!(use_context_selector(&ctx, |r| r.b), Ok(8));
    assert_eq!(*use_context(&ctx).expect("default source"), record(7, 8));
}

/// A context whose default was released has no source outside providers.
#[test]
fn released_context_is_missing_source() {
    let ctx = create_context(record(0, 0));
    let clone = ctx.clone();
    assert!(ctx.release());

    assert_eq!(
        use_context_selector(&clone, |r| r.a),
        Err(Error::MissingSource { context: ctx.id() })
    );
    assert!(select(&clone, |r| r.a).is_err());
}

struct Tracked(Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Contexts that go out of scope drop their default value.
#[test]
fn dropped_contexts_free_their_defaults() {
    let dropped = Arc::new(AtomicUsize::new(0));

    for _ in 0..100 {
        let ctx = create_context(Tracked(dropped.clone()));
        let reader = select(&ctx, |t| Arc::clone(&t.0)).expect("default source");
        let _guard = reader.subscribe(|| {});
    }

    assert_eq!(dropped.load(Ordering::SeqCst), 100);
}

/// A reader keeps hearing about changes for as long as it holds its guard.
#[test]
fn held_guard_keeps_reader_subscribed() {
    let ctx = create_context(record(0, 0));
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");
    let (count, callback) = counter();

    let _guard = reader.subscribe(callback);
    provider.commit(record(1, 0));
    provider.commit(record(2, 0));

    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(provider.source().listener_count(), 1);
}

/// Nested providers: the innermost one wins, and leaving it restores the
/// outer one.
#[test]
fn nested_providers_resolve_innermost() {
    let ctx = create_context(0);
    let outer = Provider::mount(&ctx, 1);
    let inner = Provider::mount(&ctx, 2);

    let values = outer.provide(|| {
        let before = use_context_selector(&ctx, |v| **v);
        let nested = inner.provide(|| use_context_selector(&ctx, |v| **v));
        let after = use_context_selector(&ctx, |v| **v);
        (before, nested, after)
    });

    assert_eq!(values, (Ok(1), Ok(2), Ok(1)));
    assert_eq!(use_context_selector(&ctx, |v| **v), Ok(0));
}

/// A subscriber whose callback panics does not keep the others from hearing
/// about the commit when the context contains panics.
#[test]
fn panicking_callback_is_contained() {
    let ctx = create_context_with(record(0, 0), NotifyConfig::contain_panics());
    let provider = Provider::mount(&ctx, record(0, 0));
    let reader = provider.provide(|| select(&ctx, |r| r.a)).expect("resolves");

    let _bad = reader.subscribe(|| panic!("render failed"));
    let (count, callback) = counter();
    let _good = reader.subscribe(callback);

    provider.commit(record(1, 0));
    provider.commit(record(2, 0));

    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(provider.source().listener_count(), 2);
}
