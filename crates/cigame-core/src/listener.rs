//! Advisory output for scoring events.
//!
//! The listener is the build-log channel: progress and diagnostics a
//! user sees next to their build. All messages are advisory and never
//! affect control flow.

use std::sync::Mutex;

use tracing::{info, warn};

/// Sink for advisory scoring messages.
pub trait Listener: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Default listener forwarding to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingListener;

impl TracingListener {
    pub fn new() -> Self {
        Self
    }
}

impl Listener for TracingListener {
    fn info(&self, message: &str) {
        info!(target: "cigame", "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: "cigame", "{message}");
    }
}

/// Listener that records messages in memory (testing only).
#[derive(Debug, Default)]
pub struct MemoryListener {
    messages: Mutex<Vec<String>>,
}

impl MemoryListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Listener for MemoryListener {
    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("WARN: {message}"));
    }
}
