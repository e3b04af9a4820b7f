//! # Exchange History
//!
//! Records every HTTP round trip made during a run, successful or not, so
//! the JSON report can show exactly what was sent and how long it took.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::method::HttpMethod;

/// Maximum number of exchanges to retain.
const MAX_EXCHANGES: usize = 1000;

/// A single recorded request and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub timestamp: DateTime<Utc>,
    pub method: HttpMethod,
    pub url: String,
    pub status: Option<u16>,
    pub elapsed_ms: Option<f64>,
    pub error: Option<String>,
}

/// Shared, append-only exchange log. Cloning yields another handle to the
/// same log.
#[derive(Debug, Clone, Default)]
pub struct ExchangeLog {
    entries: Arc<Mutex<VecDeque<Exchange>>>,
}

impl ExchangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exchange, evicting the oldest one once the log is full.
    pub fn push(&self, exchange: Exchange) {
        let mut entries = self.lock();
        if entries.len() >= MAX_EXCHANGES {
            entries.pop_front();
        }
        entries.push_back(exchange);
    }

    /// All exchanges in the order they happened.
    pub fn snapshot(&self) -> Vec<Exchange> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // A panicking check must not take the log down with it.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Exchange>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
