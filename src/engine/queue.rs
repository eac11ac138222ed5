// src/engine/queue.rs

//! Pure state machine behind the serialized task queue.
//!
//! Two states:
//! - `Idle`: nothing running, nothing pending.
//! - `Running`: exactly one request executing, zero or more pending.
//!
//! The core never runs anything itself. It tells the caller which request to
//! start next, so it can be tested without Tokio.

use std::collections::VecDeque;

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Running,
}

#[derive(Debug)]
pub struct QueueCore<R> {
    pending: VecDeque<R>,
    running: bool,
}

impl<R> Default for QueueCore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> QueueCore<R> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            running: false,
        }
    }

    pub fn state(&self) -> QueueState {
        if self.running {
            QueueState::Running
        } else {
            QueueState::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == QueueState::Idle
    }

    /// Number of requests waiting behind the running one.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Offer a new request.
    ///
    /// - `Idle`: the queue becomes `Running` and the request is returned; the
    ///   caller must start it now.
    /// - `Running`: the request is appended to the tail and `None` returned.
    pub fn enqueue(&mut self, request: R) -> Option<R> {
        if self.running {
            self.pending.push_back(request);
            debug!(pending = self.pending.len(), "request queued behind running invocation");
            None
        } else {
            self.running = true;
            Some(request)
        }
    }

    /// The running request settled (successfully or not).
    ///
    /// Returns the next request to start, staying `Running`, or `None` after
    /// moving to `Idle`.
    pub fn settle(&mut self) -> Option<R> {
        if !self.running {
            warn!("settle called on an idle queue; ignoring");
            return None;
        }

        match self.pending.pop_front() {
            Some(next) => Some(next),
            None => {
                self.running = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_enqueue_starts_immediately() {
        let mut q = QueueCore::new();
        assert_eq!(q.state(), QueueState::Idle);
        assert_eq!(q.enqueue(1), Some(1));
        assert_eq!(q.state(), QueueState::Running);
    }

    #[test]
    fn running_enqueue_waits_in_fifo_order() {
        let mut q = QueueCore::new();
        q.enqueue("a");
        assert_eq!(q.enqueue("b"), None);
        assert_eq!(q.enqueue("c"), None);
        assert_eq!(q.pending(), 2);

        assert_eq!(q.settle(), Some("b"));
        assert_eq!(q.state(), QueueState::Running);
        assert_eq!(q.settle(), Some("c"));
        assert_eq!(q.settle(), None);
        assert_eq!(q.state(), QueueState::Idle);
    }

    #[test]
    fn settle_on_idle_is_a_no_op() {
        let mut q: QueueCore<u8> = QueueCore::new();
        assert_eq!(q.settle(), None);
        assert!(q.is_idle());
    }
}
