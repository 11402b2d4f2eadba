//! Differentiable primitives connecting parent nodes to one output node.
//!
//! Each derived node stores a [`Function`]: a closed operation tag, the
//! ordered parent handles (order matters for asymmetric derivatives), and
//! the back-handle to the node it produced. Dispatch is a `match` over the
//! closed variant set, so no allocation or dynamic dispatch is involved.

pub mod activation;
pub mod arithmetic;

use crate::graph::{GraphInner, TensorId};
use crate::types::Element;

/// The closed set of differentiable primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    Add,
    Mul,
    Tanh,
}

impl FunctionKind {
    pub(crate) fn arity(self) -> usize {
        match self {
            FunctionKind::Add | FunctionKind::Mul => 2,
            FunctionKind::Tanh => 1,
        }
    }
}

/// Producer record of a derived node.
#[derive(Debug, Clone)]
pub(crate) struct Function {
    pub(crate) kind: FunctionKind,
    /// Ordered operand handles; `parents[0]` is the left operand.
    pub(crate) parents: Vec<TensorId>,
    /// Back-handle to the node this function produced. Attached exactly once,
    /// when the output node is constructed.
    pub(crate) output: TensorId,
}

impl Function {
    pub(crate) fn new(kind: FunctionKind, parents: Vec<TensorId>, output: TensorId) -> Self {
        assert_eq!(
            parents.len(),
            kind.arity(),
            "{:?} expects {} parent(s), got {}",
            kind,
            kind.arity(),
            parents.len()
        );
        Function {
            kind,
            parents,
            output,
        }
    }

    /// Recomputes the output value from the parents' current values.
    pub(crate) fn forward<T: Element>(&self, inner: &mut GraphInner<T>) {
        let value = match self.kind {
            FunctionKind::Add => arithmetic::add_forward(self, inner),
            FunctionKind::Mul => arithmetic::mul_forward(self, inner),
            FunctionKind::Tanh => activation::tanh_forward(self, inner),
        };
        inner.nodes[self.output.index()].value = value;
    }

    /// Accumulates this operation's gradient contributions into its parents,
    /// reading the output's already-accumulated gradient.
    ///
    /// Must only run once the output's gradient is final, i.e. in strict
    /// root-to-leaves order over the graph.
    pub(crate) fn backward<T: Element>(&self, inner: &mut GraphInner<T>) {
        match self.kind {
            FunctionKind::Add => arithmetic::add_backward(self, inner),
            FunctionKind::Mul => arithmetic::mul_backward(self, inner),
            FunctionKind::Tanh => activation::tanh_backward(self, inner),
        }
    }
}
