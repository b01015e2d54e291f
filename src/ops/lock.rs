//! Per-key reentrant locking with a timeout (§4.J): the same thread may re-acquire a key it
//! already holds without blocking; a different thread blocks until release or `timeout`
//! elapses, at which point it fails with [`OperationError::LockTimeout`] rather than block
//! forever.
use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::error::OperationError;

struct LockState {
    owner: ThreadId,
    depth: usize,
}

/// A table of per-key reentrant locks (§4.J).
pub struct KeyLocks {
    table: Mutex<HashMap<String, LockState>>,
    condvar: Condvar,
    default_timeout: Duration,
}

impl KeyLocks {
    pub fn new(default_timeout: Duration) -> Self {
        Self { table: Mutex::new(HashMap::new()), condvar: Condvar::new(), default_timeout }
    }

    /// A lock table using the §4.J default timeout of 30 seconds.
    pub fn with_default_timeout() -> Self {
        Self::new(Duration::from_secs(30))
    }

    /// Acquire the lock for `key`, blocking up to `timeout` (or the table's default) if it is
    /// held by another thread.
    pub fn acquire(&self, key: &str, timeout: Option<Duration>) -> Result<KeyGuard<'_>, OperationError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let deadline = Instant::now() + timeout;
        let this_thread = thread::current().id();

        let mut table = self.table.lock().expect("key lock table poisoned");
        loop {
            match table.get_mut(key) {
                Some(state) if state.owner == this_thread => {
                    state.depth += 1;
                    break;
                }
                Some(_) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(OperationError::LockTimeout(key.to_owned()));
                    }
                    let (guard, result) =
                        self.condvar.wait_timeout(table, deadline - now).expect("key lock table poisoned");
                    table = guard;
                    if result.timed_out() && table.contains_key(key) {
                        return Err(OperationError::LockTimeout(key.to_owned()));
                    }
                }
                None => {
                    table.insert(key.to_owned(), LockState { owner: this_thread, depth: 1 });
                    break;
                }
            }
        }
        Ok(KeyGuard { locks: self, key: key.to_owned() })
    }
}

/// An acquired lock on a key; dropping it releases one level of reentrancy, notifying waiters
/// once the depth reaches zero.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table.lock().expect("key lock table poisoned");
        if let Some(state) = table.get_mut(&self.key) {
            state.depth -= 1;
            if state.depth == 0 {
                table.remove(&self.key);
                self.locks.condvar.notify_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn same_thread_reacquires_reentrantly() {
        let locks = KeyLocks::with_default_timeout();
        let outer = locks.acquire("a", None).unwrap();
        let inner = locks.acquire("a", None).unwrap();
        drop(inner);
        drop(outer);
    }

    #[test]
    fn a_different_thread_waits_then_times_out() {
        let locks = Arc::new(KeyLocks::new(Duration::from_secs(5)));
        let _held = locks.acquire("a", None).unwrap();

        let other = Arc::clone(&locks);
        let handle = thread::spawn(move || other.acquire("a", Some(Duration::from_millis(50))));
        let result = handle.join().unwrap();
        assert!(matches!(result, Err(OperationError::LockTimeout(key)) if key == "a"));
    }

    #[test]
    fn release_wakes_a_waiting_thread() {
        let locks = Arc::new(KeyLocks::new(Duration::from_secs(5)));
        let held = locks.acquire("a", None).unwrap();

        let other = Arc::clone(&locks);
        let handle = thread::spawn(move || other.acquire("a", Some(Duration::from_secs(2))).is_ok());
        thread::sleep(Duration::from_millis(50));
        drop(held);
        assert!(handle.join().unwrap());
    }
}
