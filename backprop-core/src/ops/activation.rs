//! Unary transcendental primitives.

use crate::graph::GraphInner;
use crate::ops::{Function, FunctionKind};
use crate::tensor::Tensor;
use crate::types::Element;

fn tanh_value<T: Element>(x: T) -> T {
    let pos_exp = x.exp();
    let neg_exp = (-x).exp();
    (pos_exp - neg_exp) / (pos_exp + neg_exp)
}

pub(crate) fn tanh_forward<T: Element>(f: &Function, inner: &GraphInner<T>) -> T {
    tanh_value(inner.value(f.parents[0]))
}

/// d/dx tanh(x) = 1 - tanh(x)^2.
///
/// Reads the already-computed tanh from the output node instead of
/// recomputing the transcendental from the parent.
pub(crate) fn tanh_backward<T: Element>(f: &Function, inner: &mut GraphInner<T>) {
    let upstream = inner.grad(f.output);
    let tanh_x = inner.value(f.output);
    inner.acc_grad(f.parents[0], upstream * (T::one() - tanh_x * tanh_x));
}

/// Builds the derived node for `tanh(input)`.
pub fn tanh_op<'g, T: Element>(input: Tensor<'g, T>) -> Tensor<'g, T> {
    let graph = input.graph();
    let mut inner = graph.inner.borrow_mut();
    let value = tanh_value(inner.value(input.id()));
    let id = inner.push_derived(value, FunctionKind::Tanh, vec![input.id()]);
    drop(inner);
    Tensor::from_parts(graph, id)
}
