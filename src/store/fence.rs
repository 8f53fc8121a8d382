use std::collections::HashMap;
use std::hash::Hash;

/// Monotonic id handed out when a request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot<K> {
    Kind(K),
    Unique(RequestId),
}

/// Carried by a completion action so the reducer can tell whether the
/// response still belongs to the most recently dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    id: RequestId,
    slot: Slot<K>,
}

impl<K> Ticket<K> {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

/// Per-slice request fence.
///
/// Requests of the same kind supersede each other: only the latest
/// dispatched one is allowed to apply its result. Unique requests (e.g.
/// creating an item) never supersede anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFence<K: Hash + Eq> {
    next: u64,
    latest: HashMap<Slot<K>, RequestId>,
}

impl<K: Hash + Eq> Default for RequestFence<K> {
    fn default() -> Self {
        Self {
            next: 0,
            latest: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> RequestFence<K> {
    fn issue(&mut self) -> RequestId {
        self.next += 1;
        RequestId(self.next)
    }

    pub fn begin(&mut self, kind: K) -> Ticket<K> {
        let id = self.issue();
        let slot = Slot::Kind(kind);
        self.latest.insert(slot.clone(), id);
        Ticket { id, slot }
    }

    pub fn begin_unique(&mut self) -> Ticket<K> {
        let id = self.issue();
        let slot = Slot::Unique(id);
        self.latest.insert(slot.clone(), id);
        Ticket { id, slot }
    }

    /// Marks the ticket as resolved. Returns `false` if a newer request of
    /// the same kind was dispatched in the meantime (or the kind was
    /// abandoned), in which case the result must be dropped.
    pub fn complete(&mut self, ticket: &Ticket<K>) -> bool {
        match self.latest.get(&ticket.slot) {
            Some(current) if *current == ticket.id => {
                self.latest.remove(&ticket.slot);
                true
            }
            _ => false,
        }
    }

    /// Forget any in-flight request of this kind; its result will be dropped.
    pub fn abandon(&mut self, kind: &K) {
        self.latest.remove(&Slot::Kind(kind.clone()));
    }

    pub fn is_pending(&self, kind: &K) -> bool {
        self.latest.contains_key(&Slot::Kind(kind.clone()))
    }

    pub fn is_busy(&self) -> bool {
        !self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Kind {
        Fetch,
        Delete(String),
    }

    #[test]
    fn newer_request_supersedes_older() {
        let mut fence = RequestFence::default();
        let first = fence.begin(Kind::Fetch);
        let second = fence.begin(Kind::Fetch);
        assert!(second.id() > first.id());

        assert!(!fence.complete(&first));
        assert!(fence.is_busy());
        assert!(fence.complete(&second));
        assert!(!fence.is_busy());
    }

    #[test]
    fn different_kinds_do_not_interfere() {
        let mut fence = RequestFence::default();
        let a = fence.begin(Kind::Delete("a".into()));
        let b = fence.begin(Kind::Delete("b".into()));
        let fetch = fence.begin(Kind::Fetch);
        assert!(fence.complete(&b));
        assert!(fence.complete(&a));
        assert!(fence.is_pending(&Kind::Fetch));
        assert!(fence.complete(&fetch));
        assert!(!fence.is_busy());
    }

    #[test]
    fn unique_requests_never_supersede() {
        let mut fence: RequestFence<Kind> = RequestFence::default();
        let one = fence.begin_unique();
        let two = fence.begin_unique();
        assert!(fence.complete(&one));
        assert!(fence.complete(&two));
    }

    #[test]
    fn abandoned_requests_are_dropped() {
        let mut fence = RequestFence::default();
        let ticket = fence.begin(Kind::Fetch);
        fence.abandon(&Kind::Fetch);
        assert!(!fence.is_busy());
        assert!(!fence.complete(&ticket));
    }

    #[test]
    fn completing_twice_is_rejected() {
        let mut fence = RequestFence::default();
        let ticket = fence.begin(Kind::Fetch);
        assert!(fence.complete(&ticket));
        assert!(!fence.complete(&ticket));
    }
}
