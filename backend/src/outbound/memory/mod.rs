//! Process-local repositories.
//!
//! Records live for the lifetime of the server process. Collections keep
//! insertion order, matching a document store's natural order.

mod notifications;
mod users;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use notifications::MemoryNotificationRepository;
pub use users::MemoryUserRepository;

/// Guard a collection, recovering it from a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
