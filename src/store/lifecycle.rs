use std::fmt::Display;
use std::hash::Hash;

use super::fence::{RequestFence, Ticket};

/// The `loading` / `error` / `success` triple every slice carries, plus the
/// fence that decides which responses are still allowed to land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle<K: Hash + Eq> {
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    fence: RequestFence<K>,
}

impl<K: Hash + Eq> Default for Lifecycle<K> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            success: None,
            fence: RequestFence::default(),
        }
    }
}

impl<K: Hash + Eq + Clone + std::fmt::Debug> Lifecycle<K> {
    /// Pending transition. Supersedes any in-flight request of `kind`.
    pub fn pending(&mut self, kind: K) -> Ticket<K> {
        self.start();
        self.fence.begin(kind)
    }

    /// Pending transition for a request that never supersedes another one.
    pub fn pending_unique(&mut self) -> Ticket<K> {
        self.start();
        self.fence.begin_unique()
    }

    fn start(&mut self) {
        self.loading = true;
        self.error = None;
        self.success = None;
    }

    /// Resolves the ticket and recomputes `loading`. Returns `false` when the
    /// response is stale and must not be applied.
    pub fn settle(&mut self, ticket: &Ticket<K>) -> bool {
        let current = self.fence.complete(ticket);
        self.loading = self.fence.is_busy();
        if !current {
            log::debug!("Dropping stale response for request {:?}", ticket.id());
        }
        current
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
    }

    pub fn reject(&mut self, error: impl Display) {
        let message = error.to_string();
        log::error!("Request failed: {message}");
        self.error = Some(message);
    }

    pub fn abandon(&mut self, kind: &K) {
        self.fence.abandon(kind);
        self.loading = self.fence.is_busy();
    }

    pub fn is_pending(&self, kind: &K) -> bool {
        self.fence.is_pending(kind)
    }

    pub fn clear_messages(&mut self) {
        self.error = None;
        self.success = None;
    }
}
