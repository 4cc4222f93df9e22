//! Small shared helpers

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a component mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
