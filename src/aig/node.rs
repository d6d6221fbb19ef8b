use super::Ref;

/// A node id.
///
/// Ids start at 1 and are unique. Id 0 is reserved for the constant, which
/// is not a node of its own but only ever appears behind a [`Ref`].
pub type NodeId = u64;

/// An AIG node: a primary input or a two-input AND gate.
///
/// Negations live on the operand references ([`Ref`]), never on the nodes
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AigNode {
    /// A primary input.
    Input(NodeId),
    /// An AND gate: the output is `left AND right` once each operand's own
    /// negation is resolved.
    And { id: NodeId, left: Ref, right: Ref },
}

impl AigNode {
    /// Returns a new AND gate.
    pub fn and(id: NodeId, left: Ref, right: Ref) -> Self {
        AigNode::And { id, left, right }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, AigNode::Input(_))
    }

    pub fn is_and(&self) -> bool {
        matches!(self, AigNode::And { .. })
    }

    pub fn get_id(&self) -> NodeId {
        match *self {
            AigNode::Input(id) => id,
            AigNode::And { id, .. } => id,
        }
    }

    /// Returns the operand references if the node is an AND gate.
    pub fn get_operands(&self) -> Option<(Ref, Ref)> {
        match *self {
            AigNode::And { left, right, .. } => Some((left, right)),
            AigNode::Input(_) => None,
        }
    }
}
