//! One-time backend check with cached success.

use crate::core::helper::{HelperError, HelperResult};
use std::sync::Mutex;

/// Remembers whether a backend check has succeeded.
///
/// The check runs under the lock, so racing first callers wait for one
/// check instead of each starting their own. Only success is cached; a
/// failed check is retried by the next caller.
#[derive(Debug, Default)]
pub struct InitGuard {
    initialized: Mutex<bool>,
}

impl InitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `check` unless a previous call already succeeded.
    pub fn ensure<F>(&self, check: F) -> HelperResult<()>
    where
        F: FnOnce() -> HelperResult<()>,
    {
        // A poisoned flag is still a valid bool.
        let mut initialized = self
            .initialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *initialized {
            return Ok(());
        }
        check().map_err(|e| HelperError::NotInitialized(Box::new(e)))?;
        *initialized = true;
        Ok(())
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        *self
            .initialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_check_runs_once_after_success() {
        let guard = InitGuard::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            guard
                .ensure(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(guard.is_initialized());
    }

    #[test]
    fn test_failure_is_not_cached() {
        let guard = InitGuard::new();
        let err = guard
            .ensure(|| Err(HelperError::Inconsistent("down".into())))
            .unwrap_err();
        assert!(matches!(err, HelperError::NotInitialized(_)));
        assert_eq!(err.to_string(), "gopass is not initialized: down");
        assert!(!guard.is_initialized());

        guard.ensure(|| Ok(())).unwrap();
        assert!(guard.is_initialized());
    }

    #[test]
    fn test_concurrent_first_use_checks_once() {
        let guard = Arc::new(InitGuard::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.ensure(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        Ok(())
                    })
                })
            })
            .collect();

        for h in handles {
            assert!(h.join().unwrap().is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
