//! Shared session state: expressions, pending tasks, and the work queue.
//!
//! Every read and write goes through one mutex, held only for in-memory work.

use std::collections::BTreeMap;
use std::sync::Arc;

use distcalc_core::{ExpressionStatus, ExpressionView, OperationTimes};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::SessionError;
use crate::expression::Expression;
use crate::parser::parse;
use crate::scheduler::Dispatcher;
use crate::task::{ExpressionId, Task, TaskId};
use crate::verify::{OracleVerifier, ResultVerifier, Verification};

#[derive(Debug)]
pub struct SessionState {
    expressions: BTreeMap<ExpressionId, Expression>,
    next_expression_id: u64,
    dispatcher: Dispatcher,
}

impl SessionState {
    fn new(times: OperationTimes) -> Self {
        Self {
            expressions: BTreeMap::new(),
            next_expression_id: 0,
            dispatcher: Dispatcher::new(times),
        }
    }
}

/// What a successful result submission changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub expression_id: ExpressionId,
    /// Tasks that became ready because of this result.
    pub new_tasks: usize,
    /// Set when this result collapsed the whole tree.
    pub verification: Option<Verification>,
}

/// Counters for health reporting, read under one lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub queued_tasks: usize,
    pub pending_tasks: usize,
    pub expressions: usize,
}

/// Cloneable handle to the session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionState>>,
    verifier: Arc<dyn ResultVerifier>,
}

impl SessionStore {
    pub fn new(times: OperationTimes, verifier: Arc<dyn ResultVerifier>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState::new(times))),
            verifier,
        }
    }

    /// Store using the rational evaluator with the given relative tolerance.
    pub fn with_tolerance(times: OperationTimes, tolerance: f64) -> Self {
        Self::new(times, Arc::new(OracleVerifier::new(tolerance)))
    }

    /// Parse `text`, register it, and queue its first tasks.
    ///
    /// A bare number is verified and finished right away.
    pub fn submit(&self, text: &str) -> Result<ExpressionId, SessionError> {
        let tree = parse(text)?;

        let mut guard = self.inner.lock();
        let state = &mut *guard;
        state.next_expression_id += 1;
        let id = ExpressionId(state.next_expression_id);
        let mut expr = Expression::new(id, text, tree);

        let emitted = state.dispatcher.schedule_ready(&mut expr);
        if let Some(value) = expr.tree.root_value() {
            self.finish(&mut expr, value);
        }
        info!(expression_id = %id, tasks = emitted, status = %expr.status, "expression accepted");
        state.expressions.insert(id, expr);
        Ok(id)
    }

    /// Hand out the next queued task and mark its expression in progress.
    pub fn next_task(&self) -> Option<Task> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        let task = state.dispatcher.pop_ready()?;
        if let Some(expr) = state.expressions.get_mut(&task.expression_id) {
            expr.mark_started();
        }
        Some(task)
    }

    /// Apply a worker's result and schedule whatever it unblocked.
    pub fn ingest_result(&self, task_id: TaskId, value: f64) -> Result<Ingested, SessionError> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;

        let task = state
            .dispatcher
            .take(task_id)
            .ok_or(SessionError::TaskNotFound(task_id))?;
        let Some(expr) = state.expressions.get_mut(&task.expression_id) else {
            warn!(task_id = %task_id, expression_id = %task.expression_id, "task refers to a missing expression");
            return Err(SessionError::TaskNotFound(task_id));
        };

        expr.tree.resolve(task.node, value)?;
        let new_tasks = state.dispatcher.schedule_ready(expr);

        let verification = match expr.tree.root_value() {
            Some(root) => Some(self.finish(expr, root)),
            None => None,
        };

        Ok(Ingested {
            expression_id: expr.id,
            new_tasks,
            verification,
        })
    }

    /// Record the final value and cross-check it.
    fn finish(&self, expr: &mut Expression, value: f64) -> Verification {
        let verification = self.verifier.verify(&expr.source, value);
        expr.result = Some(value);
        if verification.is_confirmed() {
            expr.status = ExpressionStatus::Completed;
            info!(expression_id = %expr.id, result = value, "expression completed");
        } else {
            expr.status = ExpressionStatus::Failed;
            warn!(expression_id = %expr.id, result = value, outcome = ?verification, "expression failed verification");
        }
        verification
    }

    /// Every expression, ordered by id.
    pub fn list(&self) -> Vec<ExpressionView> {
        self.inner.lock().expressions.values().map(Expression::view).collect()
    }

    pub fn get(&self, id: ExpressionId) -> Option<ExpressionView> {
        self.inner.lock().expressions.get(&id).map(Expression::view)
    }

    pub fn queue_len(&self) -> usize {
        self.inner.lock().dispatcher.queue_len()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().dispatcher.pending_len()
    }

    pub fn stats(&self) -> SessionStats {
        let state = self.inner.lock();
        SessionStats {
            queued_tasks: state.dispatcher.queue_len(),
            pending_tasks: state.dispatcher.pending_len(),
            expressions: state.expressions.len(),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(OperationTimes::default(), Arc::new(OracleVerifier::default()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use distcalc_core::Operator;
    use proptest::prelude::*;

    use super::*;
    use crate::error::ParseError;

    struct AlwaysWrong;

    impl ResultVerifier for AlwaysWrong {
        fn verify(&self, _source: &str, computed: f64) -> Verification {
            Verification::Mismatch {
                expected: computed + 1.0,
                computed,
            }
        }
    }

    /// Run every task through the worker arithmetic until nothing is left.
    fn drain(store: &SessionStore) {
        while let Some(task) = store.next_task() {
            let value = task.operator.apply(task.arg1, task.arg2).unwrap();
            store.ingest_result(task.id, value).unwrap();
        }
    }

    #[test]
    fn one_plus_one() {
        let store = SessionStore::default();
        let id = store.submit("1+1").unwrap();
        assert_eq!(id, ExpressionId(1));
        assert_eq!(store.get(id).unwrap().status, ExpressionStatus::Pending);

        let task = store.next_task().unwrap();
        assert_eq!((task.operator, task.arg1, task.arg2), (Operator::Add, 1.0, 1.0));
        assert_eq!(store.get(id).unwrap().status, ExpressionStatus::InProgress);

        let ingested = store.ingest_result(task.id, 2.0).unwrap();
        assert_eq!(ingested.verification, Some(Verification::Confirmed));
        let view = store.get(id).unwrap();
        assert_eq!(view.status, ExpressionStatus::Completed);
        assert_eq!(view.result, Some(2.0));
    }

    #[test]
    fn nested_expression_unfolds_step_by_step() {
        let store = SessionStore::default();
        let id = store.submit("(1+2)*3").unwrap();

        let first = store.next_task().unwrap();
        assert_eq!((first.operator, first.arg1, first.arg2), (Operator::Add, 1.0, 2.0));
        assert!(store.next_task().is_none());

        let ingested = store.ingest_result(first.id, 3.0).unwrap();
        assert_eq!(ingested.new_tasks, 1);
        assert_eq!(ingested.verification, None);

        let second = store.next_task().unwrap();
        assert_eq!((second.operator, second.arg1, second.arg2), (Operator::Mul, 3.0, 3.0));
        store.ingest_result(second.id, 9.0).unwrap();

        let view = store.get(id).unwrap();
        assert_eq!(view.status, ExpressionStatus::Completed);
        assert_eq!(view.result, Some(9.0));
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn invalid_expression_creates_nothing() {
        let store = SessionStore::default();
        assert!(matches!(store.submit("1+"), Err(SessionError::InvalidExpression(_))));
        assert!(store.list().is_empty());
        assert_eq!(store.submit("2*2").unwrap(), ExpressionId(1));
    }

    #[test]
    fn oversized_input_is_rejected_not_fatal() {
        let store = SessionStore::default();
        let deep = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
        let huge = format!("{} + 1", "9".repeat(400));
        let handle = thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn({
                let store = store.clone();
                move || (store.submit(&deep), store.submit(&huge))
            })
            .unwrap();
        let (deep, huge) = handle.join().unwrap();
        assert!(matches!(deep, Err(SessionError::InvalidExpression(ParseError::TooDeep { .. }))));
        assert!(matches!(
            huge,
            Err(SessionError::InvalidExpression(ParseError::MalformedNumber { pos: 0 }))
        ));
        assert!(store.list().is_empty());
        assert!(store.next_task().is_none());
    }

    #[test]
    fn bare_number_completes_on_submit() {
        let store = SessionStore::default();
        let id = store.submit("-7.5").unwrap();
        let view = store.get(id).unwrap();
        assert_eq!(view.status, ExpressionStatus::Completed);
        assert_eq!(view.result, Some(-7.5));
        assert!(store.next_task().is_none());
    }

    #[test]
    fn division_by_zero_is_left_in_progress() {
        let store = SessionStore::default();
        let id = store.submit("10/0").unwrap();
        let task = store.next_task().unwrap();
        assert!(task.operator.apply(task.arg1, task.arg2).is_err());
        // The worker never reports back.
        assert_eq!(store.get(id).unwrap().status, ExpressionStatus::InProgress);
        assert_eq!(store.pending_len(), 1);
        assert_eq!(store.queue_len(), 0);
    }

    #[test]
    fn unknown_task_changes_nothing() {
        let store = SessionStore::default();
        let id = store.submit("1+2").unwrap();
        assert_eq!(
            store.ingest_result(TaskId(99), 1.0),
            Err(SessionError::TaskNotFound(TaskId(99)))
        );
        let task = store.next_task().unwrap();
        store.ingest_result(task.id, 3.0).unwrap();
        assert_eq!(
            store.ingest_result(task.id, 3.0),
            Err(SessionError::TaskNotFound(task.id))
        );
        assert_eq!(store.get(id).unwrap().result, Some(3.0));
    }

    #[test]
    fn mismatch_fails_but_keeps_computed_value() {
        let store = SessionStore::default();
        let id = store.submit("2*3").unwrap();
        let task = store.next_task().unwrap();
        let ingested = store.ingest_result(task.id, 7.0).unwrap();
        assert!(matches!(ingested.verification, Some(Verification::Mismatch { .. })));
        let view = store.get(id).unwrap();
        assert_eq!(view.status, ExpressionStatus::Failed);
        assert_eq!(view.result, Some(7.0));
    }

    #[test]
    fn custom_verifier_is_consulted() {
        let store = SessionStore::new(OperationTimes::default(), Arc::new(AlwaysWrong));
        let id = store.submit("5").unwrap();
        assert_eq!(store.get(id).unwrap().status, ExpressionStatus::Failed);
    }

    #[test]
    fn result_for_queued_task_skips_it_later() {
        let store = SessionStore::default();
        store.submit("(1+1)*(2+2)").unwrap();
        store.ingest_result(TaskId(1), 2.0).unwrap();
        let next = store.next_task().unwrap();
        assert_eq!(next.id, TaskId(2));
        store.ingest_result(next.id, 4.0).unwrap();
        let last = store.next_task().unwrap();
        assert_eq!((last.arg1, last.arg2), (2.0, 4.0));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let store = SessionStore::default();
        for text in ["1+1", "2+2", "3", "4*4"] {
            store.submit(text).unwrap();
        }
        let ids: Vec<String> = store.list().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(
            store.stats(),
            SessionStats { queued_tasks: 3, pending_tasks: 3, expressions: 4 }
        );
    }

    #[test]
    fn concurrent_pollers_get_distinct_tasks() {
        let store = SessionStore::default();
        store.submit("(1+2)*(3+4)").unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.next_task())
            })
            .collect();
        let ids: HashSet<TaskId> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap().id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(store.next_task().is_none());
    }

    #[test]
    fn many_expressions_drain_to_completion() {
        let store = SessionStore::default();
        let texts = ["1 + 2 * 3 - 4 / 2", "-(3 - 5) * 2.5", "((7))", "8 / 4 / 2"];
        for text in texts {
            store.submit(text).unwrap();
        }
        drain(&store);
        let results: Vec<Option<f64>> = store.list().into_iter().map(|v| v.result).collect();
        assert_eq!(results, vec![Some(5.0), Some(5.0), Some(7.0), Some(1.0)]);
        assert!(store
            .list()
            .iter()
            .all(|v| v.status == ExpressionStatus::Completed));
    }

    // ── Property: scheduling agrees with direct evaluation ───────

    #[derive(Debug, Clone)]
    enum Ast {
        Num(u32),
        Bin(Box<Ast>, Operator, Box<Ast>),
    }

    fn binding(op: Operator) -> u8 {
        match op {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    impl Ast {
        /// Infix text with only the parentheses precedence and left
        /// associativity require.
        fn render(&self) -> String {
            match self {
                Ast::Num(n) => n.to_string(),
                Ast::Bin(l, op, r) => {
                    let left = match l.as_ref() {
                        Ast::Bin(_, inner, _) if binding(*inner) < binding(*op) => {
                            format!("({})", l.render())
                        }
                        _ => l.render(),
                    };
                    let right = match r.as_ref() {
                        Ast::Bin(_, inner, _) if binding(*inner) <= binding(*op) => {
                            format!("({})", r.render())
                        }
                        _ => r.render(),
                    };
                    format!("{} {} {}", left, op, right)
                }
            }
        }

        fn eval(&self) -> Option<f64> {
            match self {
                Ast::Num(n) => Some(f64::from(*n)),
                Ast::Bin(l, op, r) => op.apply(l.eval()?, r.eval()?).ok(),
            }
        }
    }

    fn ast() -> impl Strategy<Value = Ast> {
        let leaf = (0u32..50).prop_map(Ast::Num);
        leaf.prop_recursive(4, 24, 2, |inner| {
            (inner.clone(), prop::sample::select(Operator::ALL.to_vec()), inner)
                .prop_map(|(l, op, r)| Ast::Bin(Box::new(l), op, Box::new(r)))
        })
    }

    #[test]
    fn render_keeps_only_required_parentheses() {
        let num = |n| Box::new(Ast::Num(n));
        let sum = Ast::Bin(num(1), Operator::Add, num(2));
        let left = Ast::Bin(Box::new(sum.clone()), Operator::Sub, num(3));
        let right = Ast::Bin(num(3), Operator::Sub, Box::new(sum.clone()));
        let product = Ast::Bin(Box::new(sum), Operator::Mul, num(4));
        assert_eq!(left.render(), "1 + 2 - 3");
        assert_eq!(right.render(), "3 - (1 + 2)");
        assert_eq!(product.render(), "(1 + 2) * 4");
    }

    proptest! {
        #[test]
        fn drained_tree_matches_direct_evaluation(tree in ast()) {
            let Some(expected) = tree.eval() else {
                return Ok(());
            };
            let store = SessionStore::default();
            let id = store.submit(&tree.render()).unwrap();
            drain(&store);
            let view = store.get(id).unwrap();
            prop_assert_eq!(view.result, Some(expected));
            prop_assert_eq!(store.pending_len(), 0);
        }

        #[test]
        fn each_node_gets_at_most_one_task(tree in ast()) {
            let store = SessionStore::default();
            store.submit(&tree.render()).unwrap();
            let mut seen = HashSet::new();
            while let Some(task) = store.next_task() {
                prop_assert!(seen.insert((task.expression_id, task.node)));
                match task.operator.apply(task.arg1, task.arg2) {
                    Ok(v) => { store.ingest_result(task.id, v).unwrap(); }
                    Err(_) => break,
                }
            }
        }
    }
}
