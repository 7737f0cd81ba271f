//! Small shared helpers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the inner value if a previous holder panicked.
///
/// Store mutations commit in-memory state only after persistence succeeds,
/// so a poisoned guard still holds a consistent snapshot.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
