// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical Task table: a single `HashMap<TaskId, Task>` guarded by
//! one `parking_lot::Mutex` (spec §4.1 ambient detail). All mutation
//! happens inside the Supervisor's command loop, so lock hold times are
//! short and never span an `.await`.

use parking_lot::Mutex;
use std::collections::HashMap;
use warden_core::{Task, TaskId, TaskState};

#[derive(Default)]
pub struct TaskTable {
    inner: Mutex<HashMap<TaskId, Task>>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: Task) {
        self.inner.lock().insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.inner.lock().get(id).cloned()
    }

    /// Apply `f` to the task in place, returning its result, or `None` if
    /// the task doesn't exist.
    pub fn with_mut<R>(&self, id: &TaskId, f: impl FnOnce(&mut Task) -> R) -> Option<R> {
        self.inner.lock().get_mut(id).map(f)
    }

    pub fn remove(&self, id: &TaskId) -> Option<Task> {
        self.inner.lock().remove(id)
    }

    pub fn all(&self) -> Vec<Task> {
        self.inner.lock().values().cloned().collect()
    }

    pub fn by_state(&self, state: TaskState) -> Vec<Task> {
        self.inner
            .lock()
            .values()
            .filter(|t| t.state == state)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "task_table_tests.rs"]
mod tests;
