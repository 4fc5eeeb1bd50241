//! Turning ready tree nodes into queued tasks.

use std::collections::HashMap;

use distcalc_core::OperationTimes;
use distcalc_queue::RingDeque;
use tracing::{debug, warn};

use crate::expression::Expression;
use crate::task::{Task, TaskId};

/// Owns the task counter, the pending index, and the work queue.
#[derive(Debug)]
pub struct Dispatcher {
    times: OperationTimes,
    next_task_id: u64,
    pending: HashMap<TaskId, Task>,
    queue: RingDeque<TaskId>,
}

impl Dispatcher {
    pub fn new(times: OperationTimes) -> Self {
        Self {
            times,
            next_task_id: 0,
            pending: HashMap::new(),
            queue: RingDeque::new(),
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        self.next_task_id += 1;
        TaskId(self.next_task_id)
    }

    /// Emit one task for every node of `expr` that has become ready.
    ///
    /// Walks the tree post-order. A node is ready when both children are
    /// leaves; a node that already has a task is skipped, so calling this
    /// again without new leaves emits nothing. Returns the number of tasks
    /// emitted.
    pub fn schedule_ready(&mut self, expr: &mut Expression) -> usize {
        let mut emitted = 0;
        for node_id in expr.tree.post_order() {
            let already = expr
                .tree
                .node(node_id)
                .map_or(true, |node| node.task_emitted);
            if already {
                continue;
            }
            let Some((operator, arg1, arg2)) = expr.tree.ready_operands(node_id) else {
                continue;
            };

            let task = Task {
                id: self.allocate_id(),
                expression_id: expr.id,
                arg1,
                arg2,
                operator,
                operation_time: self.times.for_operator(operator),
                node: node_id,
            };
            debug!(
                task_id = %task.id,
                expression_id = %expr.id,
                "queued {} {} {}",
                arg1,
                operator,
                arg2
            );
            expr.tree.mark_emitted(node_id);
            self.queue.push_back(task.id);
            self.pending.insert(task.id, task);
            emitted += 1;
        }
        emitted
    }

    /// Pop the next queued task that is still pending.
    pub fn pop_ready(&mut self) -> Option<Task> {
        while let Some(id) = self.queue.pop_front() {
            match self.pending.get(&id) {
                Some(task) => return Some(task.clone()),
                None => warn!(task_id = %id, "skipping queued task that is no longer pending"),
            }
        }
        None
    }

    /// Remove a task from the pending index.
    pub fn take(&mut self, id: TaskId) -> Option<Task> {
        self.pending.remove(&id)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
