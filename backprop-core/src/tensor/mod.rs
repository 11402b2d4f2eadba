// src/tensor/mod.rs

mod debug;

use crate::error::BackpropError;
use crate::graph::{Graph, TensorId};
use crate::ops::activation::tanh_op;
use crate::types::{DType, Element};

/// User-facing handle to one scalar node of a computation graph.
///
/// A `Tensor` is a `Copy` pair of a graph reference and a stable node
/// handle; cloning it never clones the node. The same handle may appear as
/// an operand of any number of later operations (fan-out), and the node's
/// gradient accumulator sums the contribution of every consumer.
pub struct Tensor<'g, T: Element> {
    graph: &'g Graph<T>,
    id: TensorId,
}

impl<'g, T: Element> Clone for Tensor<'g, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'g, T: Element> Copy for Tensor<'g, T> {}

impl<'g, T: Element> Tensor<'g, T> {
    pub(crate) fn from_parts(graph: &'g Graph<T>, id: TensorId) -> Self {
        Tensor { graph, id }
    }

    /// Handle of this node within its owning graph.
    pub fn id(&self) -> TensorId {
        self.id
    }

    pub(crate) fn graph(&self) -> &'g Graph<T> {
        self.graph
    }

    /// Asserts both operands belong to the same arena and returns it.
    /// Mixing handles from two graphs is a programmer error, not a
    /// recoverable condition.
    pub(crate) fn same_graph(self, other: Tensor<'g, T>) -> &'g Graph<T> {
        assert!(
            std::ptr::eq(self.graph, other.graph),
            "operands belong to different graphs"
        );
        self.graph
    }

    /// Returns the current scalar value.
    pub fn item(&self) -> T {
        self.graph.inner.borrow().value(self.id)
    }

    /// Replaces the scalar value in place.
    ///
    /// Derived values downstream are stale until [`Graph::recompute`] is
    /// called; this is the perturbation path used by the gradient checker,
    /// not part of ordinary graph construction.
    pub fn set_item(&self, value: T) {
        self.graph.inner.borrow_mut().nodes[self.id.index()].value = value;
    }

    /// Returns the accumulated gradient.
    pub fn grad(&self) -> T {
        self.graph.inner.borrow().grad(self.id)
    }

    /// Overwrites the gradient accumulator, e.g. to seed the output with 1
    /// before [`Tensor::backward`]. The seed scales all resulting gradients
    /// linearly.
    pub fn set_grad(&self, grad: T) {
        self.graph.inner.borrow_mut().nodes[self.id.index()].grad = grad;
    }

    /// True for nodes created directly from a value (no producer).
    pub fn is_leaf(&self) -> bool {
        self.graph.inner.borrow().nodes[self.id.index()]
            .grad_fn
            .is_none()
    }

    /// Always empty: every tensor is a rank-0 scalar. Kept as an explicit
    /// marker of the scalar-only contract.
    pub fn shape(&self) -> &'static [usize] {
        &[]
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Hyperbolic tangent, producing a derived node.
    pub fn tanh(&self) -> Tensor<'g, T> {
        tanh_op(*self)
    }

    /// Performs the backward pass starting from this tensor.
    ///
    /// The caller must have seeded this tensor's gradient accumulator with
    /// [`Tensor::set_grad`] (conventionally 1). Gradients accumulate into
    /// every node reachable through producer edges, in root-to-leaves
    /// order; repeated passes keep accumulating until
    /// [`Graph::zero_grads`] is called.
    ///
    /// # Errors
    /// Returns [`BackpropError::UnseededBackward`] if this tensor's gradient
    /// is still zero. Calling backward on a seeded leaf is a no-op.
    pub fn backward(&self) -> Result<(), BackpropError> {
        crate::autograd::graph::backward(self.graph, self.id)
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::Graph;
    use crate::types::DType;

    #[test]
    fn test_item_and_set_item() {
        let graph = Graph::new();
        let t = graph.tensor(5.5_f32);
        assert_eq!(t.item(), 5.5);
        t.set_item(7.0);
        assert_eq!(t.item(), 7.0);
    }

    #[test]
    fn test_shape_is_rank_zero() {
        let graph = Graph::new();
        let t = graph.tensor(4.0_f32);
        let expected: &[usize] = &[];
        assert_eq!(t.shape(), expected);
    }

    #[test]
    fn test_dtype_tags() {
        let g32 = Graph::new();
        let g64 = Graph::new();
        assert_eq!(g32.tensor(1.0_f32).dtype(), DType::F32);
        assert_eq!(g64.tensor(1.0_f64).dtype(), DType::F64);
    }

    #[test]
    fn test_handles_are_copy() {
        let graph = Graph::new();
        let t = graph.tensor(2.0_f64);
        let u = t;
        // Both handles address the same node.
        u.set_item(3.0);
        assert_eq!(t.item(), 3.0);
        assert_eq!(t.id(), u.id());
    }
}
