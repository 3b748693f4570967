use crate::error::BoxError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A side effect attached to a cell, invoked after every committed write.
///
/// Plain closures convert automatically via [`IntoEffect`]; closures that
/// produce a future go through [`Effect::future`]. Either shape may return
/// `()` or a `Result` whose error converts into [`BoxError`].
#[derive(Clone)]
pub enum Effect {
    /// Plain closure. Runs on the caller in `Sync` mode, on the blocking
    /// pool in `Async` mode.
    Blocking(Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>),
    /// Future-producing closure. Awaited on the caller in `Sync` mode,
    /// spawned onto the executor in `Async` mode.
    Future(Arc<dyn Fn() -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>),
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Blocking(_) => write!(f, "Effect::Blocking"),
            Effect::Future(_) => write!(f, "Effect::Future"),
        }
    }
}

impl Effect {
    /// An effect that does nothing, for cells that only want plain storage
    pub fn noop() -> Self { Effect::Blocking(Arc::new(|| Ok(()))) }

    /// Effect from a closure producing a future. The closure runs once per
    /// invocation, so captured state is re-read each time.
    pub fn future<F, Fut, R>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: EffectOutcome,
    {
        Effect::Future(Arc::new(move || {
            let fut = f();
            async move { fut.await.into_outcome() }.boxed()
        }))
    }

    /// Run the effect to completion on the current context.
    pub(crate) async fn invoke(&self) -> Result<(), BoxError> {
        match self {
            Effect::Blocking(f) => f(),
            Effect::Future(f) => f().await,
        }
    }
}

impl Default for Effect {
    fn default() -> Self { Self::noop() }
}

/// Return shapes an effect closure may have: `()` for infallible effects,
/// `Result<(), E>` for fallible ones.
pub trait EffectOutcome {
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl EffectOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> { Ok(()) }
}

impl<E> EffectOutcome for Result<(), E>
where E: Into<BoxError>
{
    fn into_outcome(self) -> Result<(), BoxError> { self.map_err(Into::into) }
}

/// Conversion of callback shapes into an [`Effect`].
pub trait IntoEffect {
    fn into_effect(self) -> Effect;
}

impl IntoEffect for Effect {
    fn into_effect(self) -> Effect { self }
}

impl<F, R> IntoEffect for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: EffectOutcome,
{
    fn into_effect(self) -> Effect { Effect::Blocking(Arc::new(move || self().into_outcome())) }
}
