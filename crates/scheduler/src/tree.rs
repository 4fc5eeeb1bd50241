//! Arena-backed operation tree.
//!
//! Nodes live in a `Vec` and refer to their children by [`NodeId`]. The shape
//! never changes after construction; the only mutation is an internal node
//! turning into a leaf once its value is known.

use std::fmt;

use distcalc_core::Operator;

use crate::error::TreeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Leaf(f64),
    Pending {
        op: Operator,
        left: NodeId,
        right: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationNode {
    pub kind: NodeKind,
    /// Set once a task has been created for this node. Never cleared.
    pub task_emitted: bool,
}

impl OperationNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Leaf(v) => Some(v),
            NodeKind::Pending { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationTree {
    nodes: Vec<OperationNode>,
    root: NodeId,
}

impl OperationTree {
    /// A tree that is already a single number.
    pub fn leaf(value: f64) -> Self {
        let mut builder = TreeBuilder::default();
        let root = builder.leaf(value);
        builder.finish(root)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&OperationNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root value, once the whole tree has collapsed to a leaf.
    pub fn root_value(&self) -> Option<f64> {
        self.node(self.root).and_then(OperationNode::value)
    }

    /// Operator and operand values of an internal node whose children are both leaves.
    pub fn ready_operands(&self, id: NodeId) -> Option<(Operator, f64, f64)> {
        match self.node(id)?.kind {
            NodeKind::Pending { op, left, right } => {
                let lhs = self.node(left)?.value()?;
                let rhs = self.node(right)?.value()?;
                Some((op, lhs, rhs))
            }
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn mark_emitted(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.task_emitted = true;
        }
    }

    /// Turn an internal node into a leaf holding `value`.
    pub fn resolve(&mut self, id: NodeId, value: f64) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(id.0).ok_or(TreeError::UnknownNode(id))?;
        if node.is_leaf() {
            return Err(TreeError::AlreadyResolved(id));
        }
        node.kind = NodeKind::Leaf(value);
        Ok(())
    }

    /// Node ids in post-order (left subtree, right subtree, node).
    ///
    /// Resolved nodes are not descended into.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            match node.kind {
                NodeKind::Pending { left, right, .. } if !expanded => {
                    stack.push((id, true));
                    stack.push((right, false));
                    stack.push((left, false));
                }
                _ => order.push(id),
            }
        }
        order
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node(id).map(|n| n.kind) {
            Some(NodeKind::Leaf(v)) => write!(f, "{}", v),
            Some(NodeKind::Pending { op, left, right }) => {
                f.write_str("(")?;
                self.fmt_node(left, f)?;
                write!(f, " {} ", op)?;
                self.fmt_node(right, f)?;
                f.write_str(")")
            }
            None => f.write_str("?"),
        }
    }
}

/// Fully parenthesized infix rendering of the current state.
impl fmt::Display for OperationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

/// Appends nodes bottom-up; children always precede their parent.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<OperationNode>,
}

impl TreeBuilder {
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(OperationNode {
            kind,
            task_emitted: false,
        });
        id
    }

    pub fn leaf(&mut self, value: f64) -> NodeId {
        self.push(NodeKind::Leaf(value))
    }

    pub fn op(&mut self, op: Operator, left: NodeId, right: NodeId) -> NodeId {
        self.push(NodeKind::Pending { op, left, right })
    }

    /// Value of `id` if it is a leaf.
    pub fn leaf_value(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(id.0).and_then(OperationNode::value)
    }

    /// Replace the value of an existing leaf.
    pub fn set_leaf(&mut self, id: NodeId, value: f64) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if node.is_leaf() {
                node.kind = NodeKind::Leaf(value);
            }
        }
    }

    pub fn finish(self, root: NodeId) -> OperationTree {
        OperationTree {
            nodes: self.nodes,
            root,
        }
    }
}
