//! Busy indicator
//!
//! Shown for exactly one in-flight backend call. [`BusyIndicator::begin`]
//! returns a guard; dropping the guard hides the indicator, so every exit
//! path of an operation (success, failure, early return, unwinding) hides it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    active: AtomicBool,
    label: Mutex<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    inner: Arc<Inner>,
}

/// Hides the indicator when dropped.
#[derive(Debug)]
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct BusyGuard {
    inner: Arc<Inner>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, label: &str) -> BusyGuard {
        *self
            .inner
            .label
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = label.to_string();
        self.inner.active.store(true, Ordering::SeqCst);
        BusyGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Label of the call in flight, if any
    pub fn label(&self) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        let label = self
            .inner
            .label
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Some(label.clone())
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.active.store(false, Ordering::SeqCst);
    }
}
