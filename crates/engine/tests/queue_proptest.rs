// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property: for any sequence of pushes, popping the queue empty yields a
//! sequence that is sorted by descending priority, and stable (original
//! insertion order preserved) within each priority band.

use proptest::prelude::*;
use warden_core::TaskId;
use warden_engine::queue::PriorityQueue;

proptest! {
    #[test]
    fn pop_order_is_priority_desc_then_fifo(priorities in prop::collection::vec(-5i64..5, 0..50)) {
        let mut q = PriorityQueue::new();
        let mut inserted = Vec::new();
        for (i, p) in priorities.iter().enumerate() {
            let id = TaskId::new(format!("t{i}"));
            q.push(id.clone(), *p);
            inserted.push((id, *p, i));
        }

        let mut popped = Vec::new();
        while let Some(id) = q.pop() {
            popped.push(id);
        }

        let mut expected = inserted;
        expected.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        let expected_ids: Vec<_> = expected.into_iter().map(|(id, _, _)| id).collect();

        prop_assert_eq!(popped, expected_ids);
    }
}
