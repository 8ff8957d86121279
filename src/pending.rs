//! Correlation table for requests awaiting a reply.
//!
//! Each outbound request gets its own UUID, so any number of requests may be
//! in flight at once and replies may arrive in any order. An entry is
//! consumed by the first matching reply; later duplicates find nothing.

#[cfg(test)]
#[path = "pending_test.rs"]
mod pending_test;

use std::collections::HashMap;

/// One request awaiting its reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest<H> {
    pub request_id: String,
    pub event: String,
    pub on_reply: H,
}

/// Outstanding requests keyed by request id.
#[derive(Debug)]
pub struct PendingRequests<H> {
    entries: HashMap<String, PendingRequest<H>>,
}

impl<H> Default for PendingRequests<H> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<H> PendingRequests<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request. Returns `false` if the id is already outstanding, in
    /// which case the existing entry is kept.
    pub fn register(&mut self, request_id: &str, event: &str, on_reply: H) -> bool {
        if self.entries.contains_key(request_id) {
            return false;
        }
        self.entries.insert(
            request_id.to_owned(),
            PendingRequest { request_id: request_id.to_owned(), event: event.to_owned(), on_reply },
        );
        true
    }

    /// Consume the entry for `request_id`.
    pub fn take(&mut self, request_id: &str) -> Option<PendingRequest<H>> {
        self.entries.remove(request_id)
    }

    #[must_use]
    pub fn contains(&self, request_id: &str) -> bool {
        self.entries.contains_key(request_id)
    }

    /// Drop every outstanding request and return how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
