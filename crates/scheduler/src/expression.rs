use distcalc_core::{ExpressionStatus, ExpressionView};

use crate::task::ExpressionId;
use crate::tree::OperationTree;

/// A submitted computation and the tree that is being collapsed for it.
#[derive(Debug, Clone)]
pub struct Expression {
    pub id: ExpressionId,
    pub source: String,
    pub status: ExpressionStatus,
    pub result: Option<f64>,
    pub tree: OperationTree,
}

impl Expression {
    pub fn new(id: ExpressionId, source: impl Into<String>, tree: OperationTree) -> Self {
        Self {
            id,
            source: source.into(),
            status: ExpressionStatus::Pending,
            result: None,
            tree,
        }
    }

    /// Move from pending to in_progress. Other states are left alone.
    pub fn mark_started(&mut self) {
        if self.status == ExpressionStatus::Pending {
            self.status = ExpressionStatus::InProgress;
        }
    }

    pub fn view(&self) -> ExpressionView {
        ExpressionView {
            id: self.id.to_string(),
            expression: self.source.clone(),
            status: self.status,
            result: self.result,
        }
    }
}
