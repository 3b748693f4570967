use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Effect closure plus a counter of how many times it ran.
#[allow(unused)]
pub fn counting_effect() -> (impl Fn() + Send + Sync + 'static, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let effect = move || {
        counter.fetch_add(1, Ordering::SeqCst);
    };
    (effect, runs)
}

/// Install a subscriber so effect failures logged during a test are visible.
#[allow(unused)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
