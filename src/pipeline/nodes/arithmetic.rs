//! Int32 arithmetic over two dynamic inputs.
//!
//! Every operation is checked; overflow and division by zero invalidate the
//! output instead of wrapping or panicking.

use crate::pipeline::error::{NodeError, NodeResult};
use crate::pipeline::node::TransformState;
use crate::pipeline::nodes::bi_transform::{BiTransformNode, LhsReceiver, RhsReceiver};
use crate::pipeline::receiver::DynamicValueReceiver;
use serde::{Deserialize, Serialize};

/// Binary integer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub fn apply(self, lhs: i32, rhs: i32) -> NodeResult<i32> {
        match self {
            ArithmeticOp::Add => lhs.checked_add(rhs).ok_or(NodeError::Overflow("add")),
            ArithmeticOp::Subtract => lhs.checked_sub(rhs).ok_or(NodeError::Overflow("subtract")),
            ArithmeticOp::Multiply => lhs.checked_mul(rhs).ok_or(NodeError::Overflow("multiply")),
            ArithmeticOp::Divide => {
                if rhs == 0 {
                    return Err(NodeError::DivisionByZero);
                }
                lhs.checked_div(rhs).ok_or(NodeError::Overflow("divide"))
            }
            ArithmeticOp::Modulo => {
                if rhs == 0 {
                    return Err(NodeError::DivisionByZero);
                }
                lhs.checked_rem(rhs).ok_or(NodeError::Overflow("modulo"))
            }
        }
    }
}

/// `lhs <op> rhs` over two `i32` inputs.
pub struct ArithmeticNode {
    op: ArithmeticOp,
    node: BiTransformNode<i32, i32, i32>,
}

impl ArithmeticNode {
    pub fn new(op: ArithmeticOp, downstream: impl DynamicValueReceiver<i32> + 'static) -> Self {
        Self {
            op,
            node: BiTransformNode::new("Arithmetic", downstream, move |a: &i32, b: &i32| {
                op.apply(*a, *b)
            }),
        }
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }

    pub fn lhs_receiver(&self) -> LhsReceiver<i32, i32, i32> {
        self.node.lhs_receiver()
    }

    pub fn rhs_receiver(&self) -> RhsReceiver<i32, i32, i32> {
        self.node.rhs_receiver()
    }

    pub fn state(&self) -> TransformState {
        self.node.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::receiver::UpdateRecorder;

    #[test]
    fn test_apply() {
        assert_eq!(ArithmeticOp::Add.apply(2, 3), Ok(5));
        assert_eq!(ArithmeticOp::Subtract.apply(2, 3), Ok(-1));
        assert_eq!(ArithmeticOp::Multiply.apply(4, 3), Ok(12));
        assert_eq!(ArithmeticOp::Divide.apply(7, 2), Ok(3));
        assert_eq!(ArithmeticOp::Modulo.apply(7, 2), Ok(1));
    }

    #[test]
    fn test_checked_failures() {
        assert_eq!(
            ArithmeticOp::Add.apply(i32::MAX, 1),
            Err(NodeError::Overflow("add"))
        );
        assert_eq!(
            ArithmeticOp::Divide.apply(1, 0),
            Err(NodeError::DivisionByZero)
        );
        assert_eq!(
            ArithmeticOp::Divide.apply(i32::MIN, -1),
            Err(NodeError::Overflow("divide"))
        );
        assert_eq!(
            ArithmeticOp::Modulo.apply(1, 0),
            Err(NodeError::DivisionByZero)
        );
    }

    #[test]
    fn test_node_overflow_then_recovery() {
        let recorder = UpdateRecorder::new();
        let node = ArithmeticNode::new(ArithmeticOp::Multiply, recorder.clone());

        node.lhs_receiver().on_data(i32::MAX);
        node.rhs_receiver().on_data(2);
        assert_eq!(recorder.invalidation_count(), 1);
        assert!(recorder.values().is_empty());

        node.lhs_receiver().on_data(10);
        assert_eq!(recorder.values(), vec![20]);
    }
}
