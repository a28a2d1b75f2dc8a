//! FIFO backlog of queries waiting for a network slot.

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::coordinate::Coordinate;
use crate::query::Query;

/// A pending query and the channel its single result goes to.
///
/// `complete` consumes the item, so a result can be delivered at most once.
/// Dropping an item without completing it (e.g. on reset) closes the channel,
/// which the waiting [`super::Resolution`] reports as `None`.
#[derive(Debug)]
pub(crate) struct QueueItem {
    pub query: Query,
    reply: oneshot::Sender<Option<Coordinate>>,
}

impl QueueItem {
    pub fn new(query: Query) -> (Self, oneshot::Receiver<Option<Coordinate>>) {
        let (reply, rx) = oneshot::channel();
        (Self { query, reply }, rx)
    }

    pub fn complete(self, result: Option<Coordinate>) {
        // The caller may have dropped its Resolution; nothing to deliver then.
        let _ = self.reply.send(result);
    }
}

/// Strict FIFO: no reordering, no coalescing of identical queries.
#[derive(Debug, Default)]
pub(crate) struct RequestQueue {
    items: VecDeque<QueueItem>,
}

impl RequestQueue {
    pub fn push(&mut self, item: QueueItem) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<QueueItem> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Drops every pending item, closing their channels.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
