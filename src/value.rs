use std::sync::{Arc, RwLock};

/// Shared storage behind a cell. Clones share the same slot.
pub(crate) struct ValueSlot<T>(Arc<RwLock<T>>);

/// Read-only handle onto a cell's value. Cheap to clone; every clone reads
/// the storage the owning [`StateCell`](crate::StateCell) writes.
pub struct CellReader<T>(Arc<RwLock<T>>);

impl<T> Clone for ValueSlot<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for CellReader<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> ValueSlot<T> {
    pub fn new(value: T) -> Self { Self(Arc::new(RwLock::new(value))) }

    pub fn set(&self, value: T) { *self.0.write().expect("value lock is poisoned") = value; }

    /// Calls a closure with a borrow of the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read().expect("value lock is poisoned"))
    }

    /// Read-only handle sharing this storage
    pub fn reader(&self) -> CellReader<T> { CellReader(self.0.clone()) }
}

impl<T> ValueSlot<T>
where T: Clone
{
    pub fn get(&self) -> T { self.0.read().expect("value lock is poisoned").clone() }
}

impl<T> CellReader<T> {
    /// Calls a closure with a borrow of the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read().expect("value lock is poisoned"))
    }
}

impl<T> CellReader<T>
where T: Clone
{
    /// Returns a clone of the current value
    pub fn get(&self) -> T { self.0.read().expect("value lock is poisoned").clone() }
}

impl<T: std::fmt::Display> std::fmt::Display for CellReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| value.fmt(f))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for CellReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| f.debug_tuple("CellReader").field(value).finish())
    }
}
