//! Listener hooks for fetch outcomes.
//!
//! Embedders implement [`RemoteConfigEvents`] to observe loads and failures
//! without polling the service. All methods default to no-ops.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Hook invoked when a fetch completes.
pub trait RemoteConfigEvents: Send + Sync {
    /// Called once per fetch with its outcome, including the override
    /// short-circuit path.
    fn on_config_loaded(&self, _success: bool) {}
    /// Called when the transport reports a failure.
    fn on_error(&self, _message: &str) {}
}

/// Listener that counts notifications and keeps the last error message.
#[derive(Debug, Default)]
pub struct CountingEvents {
    loaded_ok: AtomicUsize,
    loaded_failed: AtomicUsize,
    errors: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl CountingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_ok(&self) -> usize {
        self.loaded_ok.load(Ordering::Relaxed)
    }

    pub fn loaded_failed(&self) -> usize {
        self.loaded_failed.load(Ordering::Relaxed)
    }

    /// Total `on_config_loaded` notifications.
    pub fn loaded(&self) -> usize {
        self.loaded_ok() + self.loaded_failed()
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<String> {
        match self.last_error.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RemoteConfigEvents for CountingEvents {
    fn on_config_loaded(&self, success: bool) {
        let counter = if success {
            &self.loaded_ok
        } else {
            &self.loaded_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn on_error(&self, message: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        let mut last = match self.last_error.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last = Some(message.to_string());
    }
}
