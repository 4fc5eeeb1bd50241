//! Expression decomposition and task scheduling.
//!
//! An expression is parsed into an [`OperationTree`]; every internal node
//! whose children are both numbers becomes a [`Task`] on the work queue.
//! Results flow back through [`SessionStore::ingest_result`], which resolves
//! the node and queues whatever became ready, until the root is a number.

pub mod error;
pub mod expression;
pub mod parser;
pub mod scheduler;
pub mod store;
pub mod task;
pub mod tree;
pub mod verify;

pub use error::{InvalidId, ParseError, SessionError, TreeError};
pub use expression::Expression;
pub use parser::{parse, MAX_NESTING};
pub use scheduler::Dispatcher;
pub use store::{Ingested, SessionStats, SessionStore};
pub use task::{ExpressionId, Task, TaskId};
pub use tree::{NodeId, NodeKind, OperationNode, OperationTree};
pub use verify::{OracleVerifier, ResultVerifier, Verification};
