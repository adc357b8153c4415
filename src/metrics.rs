//! Session-keyed generation metrics with bounded retention.
//!
//! The store is created by the caller and injected into the generator; there is
//! no process-wide instance. Both the number of sessions and the number of
//! records kept per session are capped, and the oldest data is evicted first.

use crate::generator::{GenerationMetrics, GenerationMode};
use ahash::AHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// One recorded generation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub mode: GenerationMode,
    pub success: bool,
    pub retry_count: u32,
    pub metrics: GenerationMetrics,
}

#[derive(Default)]
struct Inner {
    sessions: AHashMap<String, VecDeque<MetricsRecord>>,
    // Insertion order of session ids, oldest first.
    order: VecDeque<String>,
}

pub struct MetricsStore {
    inner: Mutex<Inner>,
    max_sessions: usize,
    max_entries: usize,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_MAX_ENTRIES)
    }
}

impl MetricsStore {
    /// Limits below one are raised to one.
    pub fn new(max_sessions: usize, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_sessions: max_sessions.max(1),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&self, session_id: &str, record: MetricsRecord) {
        let mut inner = self.inner.lock();

        if !inner.sessions.contains_key(session_id) {
            while inner.order.len() >= self.max_sessions {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.sessions.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(session_id.to_string());
        }

        let entries = inner.sessions.entry(session_id.to_string()).or_default();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Records for one session, oldest first.
    pub fn session(&self, session_id: &str) -> Vec<MetricsRecord> {
        self.inner
            .lock()
            .sessions
            .get(session_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops a session, returning whether it existed.
    pub fn evict(&self, session_id: &str) -> bool {
        let mut inner = self.inner.lock();
        inner.order.retain(|id| id != session_id);
        inner.sessions.remove(session_id).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.sessions.clear();
        inner.order.clear();
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().sessions.len()
    }
}
