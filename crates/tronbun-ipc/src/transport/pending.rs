//! Table of commands awaiting a completion from the helper.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};
use tronbun_common::TransportError;

use crate::protocol::InboundMessage;

pub(crate) type Settlement = Result<Value, TransportError>;

pub(crate) struct PendingEntry {
    method: String,
    token: u64,
    sender: oneshot::Sender<Settlement>,
    /// Disarms the deadline timer once the entry leaves the table.
    _expiry: DropGuard,
}

impl PendingEntry {
    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// Complete the waiting caller from a helper response.
    pub(crate) fn settle(self, message: InboundMessage) {
        let outcome = message
            .into_outcome()
            .map_err(|message| TransportError::CommandError {
                method: self.method.clone(),
                message,
            });
        let _ = self.sender.send(outcome);
    }

    pub(crate) fn reject(self, error: TransportError) {
        let _ = self.sender.send(Err(error));
    }
}

#[derive(Default)]
struct TableState {
    entries: HashMap<String, PendingEntry>,
    closed: bool,
}

/// Pending commands keyed by id.
///
/// Every entry leaves the table exactly once: through a response, its
/// deadline, or teardown. Whoever removes it owns the settlement.
#[derive(Default)]
pub(crate) struct PendingTable {
    state: Mutex<TableState>,
    next_token: AtomicU64,
}

impl PendingTable {
    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a command. Returns the ownership token and a token that is
    /// cancelled when the entry is settled or dropped, or `None` once the
    /// table has been closed by teardown.
    pub(crate) fn insert(
        &self,
        id: String,
        method: &str,
        sender: oneshot::Sender<Settlement>,
    ) -> Option<(u64, CancellationToken)> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let expiry = CancellationToken::new();
        let entry = PendingEntry {
            method: method.to_string(),
            token,
            sender,
            _expiry: expiry.clone().drop_guard(),
        };

        let mut state = self.lock();
        if state.closed {
            return None;
        }
        if let Some(previous) = state.entries.insert(id, entry) {
            let method = previous.method.clone();
            previous.reject(TransportError::CommandError {
                method,
                message: "superseded by a newer command with the same id".into(),
            });
        }
        Some((token, expiry))
    }

    pub(crate) fn take(&self, id: &str) -> Option<PendingEntry> {
        self.lock().entries.remove(id)
    }

    /// Remove the entry only if it is still the one registered under `token`.
    pub(crate) fn take_owned(&self, id: &str, token: u64) -> Option<PendingEntry> {
        let mut state = self.lock();
        match state.entries.get(id) {
            Some(entry) if entry.token == token => state.entries.remove(id),
            _ => None,
        }
    }

    /// Empty the table and refuse further inserts.
    pub(crate) fn close(&self) -> Vec<(String, PendingEntry)> {
        let mut state = self.lock();
        state.closed = true;
        state.entries.drain().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }
}
