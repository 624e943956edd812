//! Scripted in-memory transport.
//!
//! Responses are served from a queue in FIFO order; once the queue is empty
//! the fallback response (a failure unless configured) is returned. Every
//! call is recorded so tests can assert whether, and how, the network would
//! have been hit.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ConfigTransport, TransportError};

/// Arguments of a single fetch observed by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub bundle_id: String,
    pub server_url: String,
    pub config_name: String,
}

#[derive(Debug, Clone)]
enum Scripted {
    Body(String),
    Failure(String),
}

impl Scripted {
    fn into_result(self) -> Result<String, TransportError> {
        match self {
            Self::Body(body) => Ok(body),
            Self::Failure(message) => Err(TransportError::Scripted(message)),
        }
    }
}

/// In-memory [`ConfigTransport`] for tests and offline hosts.
#[derive(Debug)]
pub struct MemoryTransport {
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Scripted>,
    fetches: Mutex<Vec<RecordedFetch>>,
    network_available: AtomicBool,
    device_id: String,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Scripted::Failure("no scripted response".to_string())),
            fetches: Mutex::new(Vec::new()),
            network_available: AtomicBool::new(true),
            device_id: "memory-device".to_string(),
        }
    }

    /// Transport that answers every fetch with `body`.
    pub fn always(body: impl Into<String>) -> Self {
        let transport = Self::new();
        transport.set_fallback_body(body);
        transport
    }

    /// Transport that fails every fetch.
    pub fn failing() -> Self {
        Self::new()
    }

    /// Queues a successful response.
    pub fn push_body(&self, body: impl Into<String>) {
        lock(&self.queue).push_back(Scripted::Body(body.into()));
    }

    /// Queues a failed response.
    pub fn push_failure(&self, message: impl Into<String>) {
        lock(&self.queue).push_back(Scripted::Failure(message.into()));
    }

    /// Sets the response used once the queue is drained.
    pub fn set_fallback_body(&self, body: impl Into<String>) {
        *lock(&self.fallback) = Scripted::Body(body.into());
    }

    pub fn set_fallback_failure(&self, message: impl Into<String>) {
        *lock(&self.fallback) = Scripted::Failure(message.into());
    }

    pub fn set_network_available(&self, available: bool) {
        self.network_available.store(available, Ordering::Relaxed);
    }

    /// All fetches observed so far.
    pub fn fetches(&self) -> Vec<RecordedFetch> {
        lock(&self.fetches).clone()
    }

    pub fn fetch_count(&self) -> usize {
        lock(&self.fetches).len()
    }
}

#[async_trait]
impl ConfigTransport for MemoryTransport {
    async fn fetch_config(
        &self,
        bundle_id: &str,
        server_url: &str,
        config_name: &str,
    ) -> Result<String, TransportError> {
        lock(&self.fetches).push(RecordedFetch {
            bundle_id: bundle_id.to_string(),
            server_url: server_url.to_string(),
            config_name: config_name.to_string(),
        });
        if !self.is_network_available() {
            return Err(TransportError::NetworkUnavailable);
        }
        let next = lock(&self.queue).pop_front();
        next.unwrap_or_else(|| lock(&self.fallback).clone())
            .into_result()
    }

    fn is_network_available(&self) -> bool {
        self.network_available.load(Ordering::Relaxed)
    }

    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryTransport"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
