mod common;

use common::counting_effect;
use effect_cell::{CellConfig, Mode, StateCell, WriteOptions};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

/// Every synchronous write updates the value and runs the effect exactly once
#[tokio::test]
async fn sync_write_updates_value_and_runs_effect() {
    let (effect, runs) = counting_effect();
    let cell = StateCell::with_config(0, effect, CellConfig::new().with_mode(Mode::Sync));

    cell.set(1).await.unwrap();
    assert_eq!(cell.get(), 1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    cell.set(2).await.unwrap();
    assert_eq!(cell.get(), 2);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

/// Writing the same value again still runs the effect; writes are not
/// change-detected
#[tokio::test]
async fn identical_value_still_triggers_the_effect() {
    let (effect, runs) = counting_effect();
    let cell = StateCell::with_config(7, effect, CellConfig::new().with_mode(Mode::Sync));

    cell.set(7).await.unwrap();
    cell.set(7).await.unwrap();
    assert_eq!(cell.get(), 7);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

/// Skip-effect writes update the value without invoking the effect
#[tokio::test]
async fn skip_effect_writes_are_silent() {
    let (effect, runs) = counting_effect();
    let cell = StateCell::with_config(0, effect, CellConfig::new().with_mode(Mode::Sync));

    cell.set_with(5, WriteOptions::new().skip_effect()).await.unwrap();
    assert_eq!(cell.get(), 5);
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    cell.set_silent(6).await;
    assert_eq!(cell.get(), 6);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

/// Pausing suppresses the effect but never the value update; resuming
/// restores invocation without replaying suppressed writes
#[tokio::test]
async fn pause_gates_the_effect_not_the_value() {
    let (effect, runs) = counting_effect();
    let cell = StateCell::with_config(0, effect, CellConfig::new().with_mode(Mode::Sync));

    cell.pause_effect();
    cell.set(1).await.unwrap();
    cell.set(2).await.unwrap();
    assert_eq!(cell.get(), 2);
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    cell.resume_effect();
    cell.set(3).await.unwrap();
    assert_eq!(cell.get(), 3);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// Counting walkthrough: plain write, skip write, paused write, resumed write
#[tokio::test]
async fn counting_walkthrough() {
    let (effect, runs) = counting_effect();
    let cell = StateCell::with_config(0, effect, CellConfig::new().with_mode(Mode::Sync));

    cell.set(1).await.unwrap();
    assert_eq!((cell.get(), runs.load(Ordering::SeqCst)), (1, 1));

    cell.set_with(2, WriteOptions::new().skip_effect()).await.unwrap();
    assert_eq!((cell.get(), runs.load(Ordering::SeqCst)), (2, 1));

    cell.pause_effect();
    cell.set(3).await.unwrap();
    assert_eq!((cell.get(), runs.load(Ordering::SeqCst)), (3, 1));

    cell.resume_effect();
    cell.set(4).await.unwrap();
    assert_eq!((cell.get(), runs.load(Ordering::SeqCst)), (4, 2));
}

/// A per-write Sync override on an Async-default cell runs the effect before
/// the write returns
#[tokio::test]
async fn sync_override_runs_inline() {
    let (effect, runs) = counting_effect();
    let cell = StateCell::new(0, effect);

    cell.set_with(1, WriteOptions::new().with_mode(Mode::Sync)).await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(cell.get(), 1);
}

/// A per-write Async override on a Sync-default cell returns while the
/// effect is still parked
#[tokio::test]
async fn async_override_returns_before_the_effect_runs() {
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let rx = Arc::new(Mutex::new(rx));
    let (effect, runs) = {
        let (inner, runs) = counting_effect();
        let gated = move || {
            rx.lock().unwrap().recv().unwrap();
            inner();
        };
        (gated, runs)
    };
    let cell = StateCell::with_config(0, effect, CellConfig::new().with_mode(Mode::Sync));

    cell.set_with(1, WriteOptions::new().with_mode(Mode::Async)).await.unwrap();
    assert_eq!(cell.get(), 1, "value commits before the effect is released");
    assert_eq!(runs.load(Ordering::SeqCst), 0, "effect is still parked on the gate");

    tx.send(()).unwrap();
    cell.wait_idle().await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// Readers share storage with the cell and see every committed write
#[tokio::test]
async fn readers_see_writes() {
    let cell = StateCell::new("a".to_string(), || {});
    let reader = cell.reader();

    cell.set_silent("b".to_string()).await;
    assert_eq!(reader.get(), "b");
    assert_eq!(format!("{reader}"), "b");
    assert_eq!(reader.with(|value| value.len()), 1);
}

/// Borrowing reads work for values that are not Clone
#[tokio::test]
async fn with_borrows_without_cloning() {
    struct Opaque(u64);

    let cell = StateCell::new(Opaque(3), || {});
    cell.set_silent(Opaque(4)).await;
    assert_eq!(cell.with(|value| value.0), 4);
}
