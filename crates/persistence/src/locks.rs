//! Per-call mutual exclusion
//!
//! Two webhook turns for the same call must not interleave their
//! read-modify-write of the session. Each call id maps to its own async
//! mutex; turns for different calls never contend.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Registry of per-call locks
#[derive(Default, Clone)]
pub struct CallLocks {
    inner: Arc<LockMap>,
}

impl CallLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `call_id`
    pub async fn acquire(&self, call_id: &str) -> CallGuard {
        // the map reference must be released before awaiting
        let mutex = self.inner.entry(call_id.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;

        CallGuard {
            call_id: call_id.to_string(),
            locks: Arc::clone(&self.inner),
            guard: Some(guard),
        }
    }

    /// Number of calls with a live lock entry
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one call's session until dropped
pub struct CallGuard {
    call_id: String,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl CallGuard {
    pub fn call_id(&self) -> &str {
        &self.call_id
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map itself still holds the mutex: nobody is waiting
        self.locks
            .remove_if(&self.call_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl std::fmt::Debug for CallGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallGuard")
            .field("call_id", &self.call_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_pruned_after_release() {
        let locks = CallLocks::new();
        {
            let guard = locks.acquire("CA1").await;
            assert_eq!(guard.call_id(), "CA1");
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_same_call_is_serialized() {
        let locks = CallLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("CA1").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_calls_do_not_contend() {
        let locks = CallLocks::new();
        let _a = locks.acquire("CA1").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("CA2")).await;
        assert!(b.is_ok());
    }
}
