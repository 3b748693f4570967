/*!
A mutable state cell that runs a user-supplied side effect whenever its value
is written. The value is plain shared state; the interesting part is what
happens around each write: where the effect runs, whether consecutive effects
may overlap, and how failures surface.

# Design requirements:
- Reads never involve the effect and never block on it
- Writes commit the new value before the effect is dispatched, so a failing
  or slow effect cannot hide the write
- Per-cell execution mode ([`Mode::Sync`] or [`Mode::Async`]), overridable on
  any individual write
- [`Sequencing::Dependent`] cells never let two effects overlap: each write
  first waits out the previous effect task
- Pausing ([`StateCell::pause_effect`]) and per-write skipping suppress the
  effect without ever suppressing the value update
- Failures of background effects are routed to an error sink or the log, not
  lost with the task

# Basic usage

Synchronous mode runs the effect on the writer before the write returns:

```rust
use effect_cell::{CellConfig, Mode, StateCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

# tokio_test::block_on(async {
let runs = Arc::new(AtomicUsize::new(0));
let counter = runs.clone();
let cell = StateCell::with_config(
    0,
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    },
    CellConfig::new().with_mode(Mode::Sync),
);

cell.set(1).await.unwrap();
assert_eq!(cell.get(), 1);
assert_eq!(runs.load(Ordering::SeqCst), 1);

cell.pause_effect();
cell.set(2).await.unwrap(); // value updates, effect stays quiet
assert_eq!(cell.get(), 2);
assert_eq!(runs.load(Ordering::SeqCst), 1);
# });
```

# Asynchronous effects

`Async` mode (the default) hands the effect to a background task and returns
immediately; [`StateCell::wait_idle`] joins the tracked task:

```rust
use effect_cell::StateCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

# tokio_test::block_on(async {
let runs = Arc::new(AtomicUsize::new(0));
let counter = runs.clone();
let cell = StateCell::new(0, move || {
    counter.fetch_add(1, Ordering::SeqCst);
});

cell.set(1).await.unwrap();
assert_eq!(cell.get(), 1); // visible before the effect finishes

cell.wait_idle().await.unwrap();
assert_eq!(runs.load(Ordering::SeqCst), 1);
# });
```

# Dependent sequencing

A `Dependent` cell joins the previous effect before committing the next
value, so effects observe every value in order and never run concurrently
with each other:

```rust
use effect_cell::{CellConfig, Effect, Sequencing, StateCell};
use std::time::Duration;

# tokio_test::block_on(async {
let effect = Effect::future(|| async {
    tokio::time::sleep(Duration::from_millis(5)).await;
});
let config = CellConfig::new().with_sequencing(Sequencing::Dependent);
let cell = StateCell::with_config(0, effect, config);

cell.set(1).await.unwrap();
cell.set(2).await.unwrap(); // waited for the first effect to finish
cell.wait_idle().await.unwrap();
# });
```

# Error handling

A synchronously executed effect hands its failure straight to the writer as
an [`EffectError`]. Background effects report through the cell's error sink,
or the log when none is configured; the writer itself never fails:

```rust
use effect_cell::{CellConfig, StateCell};

# tokio_test::block_on(async {
let cell = StateCell::with_config(
    0,
    || Err::<(), std::io::Error>(std::io::Error::other("disk full")),
    CellConfig::new().with_error_sink(|err| eprintln!("{err}")),
);

cell.set(1).await.unwrap(); // the write itself succeeds
cell.wait_idle().await.unwrap();
assert_eq!(cell.get(), 1);
# });
```
*/

mod cell;
mod effect;
mod error;
mod value;

pub use cell::{CellConfig, ErrorSink, Mode, Sequencing, StateCell, WriteOptions};
pub use effect::{Effect, EffectOutcome, IntoEffect};
pub use error::{BoxError, EffectError};
pub use value::CellReader;
