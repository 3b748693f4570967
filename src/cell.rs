use crate::effect::{Effect, IntoEffect};
use crate::error::{EffectError, panic_message};
use crate::value::{CellReader, ValueSlot};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Execution mode for a cell's side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Run the effect on the writer's own context; the write returns once it
    /// has completed
    Sync,
    /// Run the effect on a background task; the write returns immediately
    #[default]
    Async,
}

/// Sequencing policy between successive asynchronous effects on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sequencing {
    /// Effects from successive writes may overlap in time
    #[default]
    Independent,
    /// Each write waits for the previous asynchronous effect to finish
    /// before committing its value or starting its own effect
    Dependent,
}

/// Callback receiving failures of asynchronously executed effects.
pub type ErrorSink = Arc<dyn Fn(EffectError) + Send + Sync>;

/// Cell-level configuration: the default execution mode, the sequencing
/// policy, and an optional failure sink for asynchronous effects.
#[derive(Clone, Default)]
pub struct CellConfig {
    /// Default execution mode, overridable per write
    pub mode: Mode,
    /// Sequencing policy for asynchronous effects
    pub sequencing: Sequencing,
    /// Receives failures of asynchronously executed effects; when unset they
    /// are logged at error level instead
    pub error_sink: Option<ErrorSink>,
}

impl std::fmt::Debug for CellConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellConfig")
            .field("mode", &self.mode)
            .field("sequencing", &self.sequencing)
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}

impl CellConfig {
    pub fn new() -> Self { Self::default() }

    /// Set the default execution mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the sequencing policy
    pub fn with_sequencing(mut self, sequencing: Sequencing) -> Self {
        self.sequencing = sequencing;
        self
    }

    /// Route asynchronous effect failures to a callback instead of the log
    pub fn with_error_sink<F>(mut self, sink: F) -> Self
    where F: Fn(EffectError) + Send + Sync + 'static {
        self.error_sink = Some(Arc::new(sink));
        self
    }
}

/// Per-write options: override the cell's default execution mode and/or skip
/// the effect for this write only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Overrides the cell's default execution mode for this write
    pub mode: Option<Mode>,
    /// Update the value without invoking the effect, regardless of pause
    /// state
    pub skip_effect: bool,
}

impl WriteOptions {
    pub fn new() -> Self { Self::default() }

    /// Override the execution mode for this write
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Update the value without invoking the effect
    pub fn skip_effect(mut self) -> Self {
        self.skip_effect = true;
        self
    }
}

/// A mutable state cell that runs a side effect whenever its value is
/// written.
///
/// Reads ([`get`](Self::get), [`with`](Self::with), [`reader`](Self::reader))
/// never involve the effect. Writes commit the new value first and only then
/// dispatch the effect, so the committed value is visible even while the
/// effect is still running, and regardless of whether it fails.
///
/// Writes take `&self`; the cell is `Send + Sync` when `T` is and may be
/// shared behind an [`Arc`]. Values are last-write-wins under concurrent
/// writers, but the sequencing guarantees of [`Sequencing::Dependent`] are
/// stated for one logical writer at a time. The effect must not write back
/// into its own cell: under `Dependent` sequencing the nested write waits on
/// the effect's own task and deadlocks.
///
/// Dropping the cell detaches a still-running effect task rather than
/// cancelling it. Call [`wait_idle`](Self::wait_idle) first when teardown
/// must not outrun the effect.
pub struct StateCell<T> {
    slot: ValueSlot<T>,
    effect: Effect,
    config: CellConfig,
    paused: AtomicBool,
    /// Latest asynchronous effect task; at most one is tracked at a time
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl<T> StateCell<T> {
    /// Cell with the default configuration: `Async` mode, `Independent`
    /// sequencing, failures logged.
    pub fn new(initial: T, effect: impl IntoEffect) -> Self {
        Self::with_config(initial, effect, CellConfig::default())
    }

    pub fn with_config(initial: T, effect: impl IntoEffect, config: CellConfig) -> Self {
        Self {
            slot: ValueSlot::new(initial),
            effect: effect.into_effect(),
            config,
            paused: AtomicBool::new(false),
            inflight: Mutex::new(None),
        }
    }

    /// Calls a closure with a borrow of the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R { self.slot.with(f) }

    /// Read-only handle sharing this cell's storage
    pub fn reader(&self) -> CellReader<T> { self.slot.reader() }

    /// The cell's configuration
    pub fn config(&self) -> &CellConfig { &self.config }

    /// Suppress effect invocation for subsequent writes. Idempotent; an
    /// already-launched task is unaffected.
    pub fn pause_effect(&self) { self.paused.store(true, Ordering::Relaxed); }

    /// Re-enable effect invocation for subsequent writes. Idempotent.
    pub fn resume_effect(&self) { self.paused.store(false, Ordering::Relaxed); }

    /// Whether effect invocation is currently suppressed
    pub fn is_paused(&self) -> bool { self.paused.load(Ordering::Relaxed) }

    /// Write with the cell's default options.
    pub async fn set(&self, value: T) -> Result<(), EffectError> {
        self.set_with(value, WriteOptions::default()).await
    }

    /// Write without invoking the effect, regardless of mode or pause state.
    pub async fn set_silent(&self, value: T) {
        // skip-effect writes cannot fail
        let _ = self.set_with(value, WriteOptions::new().skip_effect()).await;
    }

    /// Write the value, then invoke the side effect per the resolved
    /// options.
    ///
    /// Under [`Sequencing::Dependent`] the previous asynchronous effect is
    /// awaited before the new value is committed. The effect outcome is
    /// returned for synchronously executed effects; asynchronous outcomes go
    /// to the error sink.
    pub async fn set_with(&self, value: T, options: WriteOptions) -> Result<(), EffectError> {
        let mut inflight = self.inflight.lock().await;

        if self.config.sequencing == Sequencing::Dependent {
            if let Some(handle) = inflight.take() {
                tracing::debug!("waiting for in-flight side effect before committing");
                if let Err(err) = handle.await {
                    report(Err(err.into()), self.config.error_sink.as_ref());
                }
            }
        }

        // The new value is visible from here on; the effect never gates it
        self.slot.set(value);

        if options.skip_effect || self.is_paused() {
            return Ok(());
        }

        match options.mode.unwrap_or(self.config.mode) {
            Mode::Async => {
                // Replacing an unfinished handle detaches that task; it keeps
                // running and reports through the error sink on its own
                *inflight = Some(self.spawn_effect());
                Ok(())
            }
            Mode::Sync => {
                drop(inflight);
                self.effect.invoke().await.map_err(EffectError::Failed)
            }
        }
    }

    /// Wait until no tracked asynchronous effect is running for this cell.
    ///
    /// A failed effect has already reported through the error sink by the
    /// time its task finishes, so this returns `Ok` for it; the error here
    /// covers the task itself being cancelled out from under the cell.
    pub async fn wait_idle(&self) -> Result<(), EffectError> {
        let handle = self.inflight.lock().await.take();
        match handle {
            Some(handle) => handle.await.map_err(EffectError::from),
            None => Ok(()),
        }
    }

    /// Launch the effect on a background task. Failures, including panics,
    /// are routed from inside the task, so a handle that is replaced without
    /// ever being awaited still surfaces its outcome.
    fn spawn_effect(&self) -> JoinHandle<()> {
        let sink = self.config.error_sink.clone();
        match &self.effect {
            Effect::Blocking(f) => {
                let f = f.clone();
                tokio::task::spawn_blocking(move || {
                    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| f())) {
                        Ok(result) => result.map_err(EffectError::Failed),
                        Err(payload) => Err(EffectError::Panicked(panic_message(payload))),
                    };
                    report(outcome, sink.as_ref());
                })
            }
            Effect::Future(f) => {
                let f = f.clone();
                tokio::spawn(async move {
                    // f() runs inside the caught future so a panicking
                    // factory closure reports like a panicking effect
                    let guarded = AssertUnwindSafe(async move { f().await }).catch_unwind();
                    let outcome = match guarded.await {
                        Ok(result) => result.map_err(EffectError::Failed),
                        Err(payload) => Err(EffectError::Panicked(panic_message(payload))),
                    };
                    report(outcome, sink.as_ref());
                })
            }
        }
    }
}

impl<T> StateCell<T>
where T: Clone
{
    /// Returns a clone of the current value
    pub fn get(&self) -> T { self.slot.get() }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| {
            f.debug_struct("StateCell")
                .field("value", value)
                .field("paused", &self.is_paused())
                .finish()
        })
    }
}

/// Route an asynchronous effect outcome: failures go to the sink when one is
/// configured, to the log otherwise.
fn report(outcome: Result<(), EffectError>, sink: Option<&ErrorSink>) {
    if let Err(err) = outcome {
        match sink {
            Some(sink) => sink(err),
            None => tracing::error!("state cell side effect failed: {}", err),
        }
    }
}
