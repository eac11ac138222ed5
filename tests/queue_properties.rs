// tests/queue_properties.rs

use std::collections::VecDeque;

use proptest::prelude::*;

use assetline::engine::{QueueCore, QueueState};

#[derive(Debug, Clone, Copy)]
enum Op {
    Enqueue,
    Settle,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Enqueue), Just(Op::Settle)]
}

proptest! {
    /// Whatever the interleaving, requests start in the order they were
    /// enqueued and at most one is ever running.
    #[test]
    fn requests_start_in_fifo_order(ops in proptest::collection::vec(op(), 1..64)) {
        let mut core = QueueCore::new();
        let mut started = Vec::new();
        let mut running: Option<usize> = None;
        let mut model: VecDeque<usize> = VecDeque::new();
        let mut next_id = 0usize;

        for op in ops {
            match op {
                Op::Enqueue => {
                    let id = next_id;
                    next_id += 1;
                    match core.enqueue(id) {
                        Some(now) => {
                            prop_assert!(running.is_none());
                            prop_assert_eq!(now, id);
                            running = Some(now);
                            started.push(now);
                        }
                        None => {
                            prop_assert!(running.is_some());
                            model.push_back(id);
                        }
                    }
                }
                Op::Settle => {
                    let next = core.settle();
                    prop_assert_eq!(next, model.pop_front());
                    running = next;
                    if let Some(n) = next {
                        started.push(n);
                    }
                }
            }
            prop_assert_eq!(core.pending(), model.len());
            prop_assert_eq!(core.state() == QueueState::Running, running.is_some());
        }

        let mut sorted = started.clone();
        sorted.sort_unstable();
        prop_assert_eq!(started, sorted);
    }
}
