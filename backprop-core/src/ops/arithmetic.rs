//! Addition and multiplication primitives, plus the operator overloads that
//! build the computation graph.

use std::ops::{Add, Mul, Sub};

use crate::graph::GraphInner;
use crate::ops::{Function, FunctionKind};
use crate::tensor::Tensor;
use crate::types::Element;

pub(crate) fn add_forward<T: Element>(f: &Function, inner: &GraphInner<T>) -> T {
    inner.value(f.parents[0]) + inner.value(f.parents[1])
}

/// d/da (a + b) = 1, d/db (a + b) = 1: the output gradient flows to both
/// parents unchanged.
pub(crate) fn add_backward<T: Element>(f: &Function, inner: &mut GraphInner<T>) {
    let upstream = inner.grad(f.output);
    inner.acc_grad(f.parents[0], upstream);
    inner.acc_grad(f.parents[1], upstream);
}

pub(crate) fn mul_forward<T: Element>(f: &Function, inner: &GraphInner<T>) -> T {
    inner.value(f.parents[0]) * inner.value(f.parents[1])
}

/// Product rule: d/da (a * b) = b, d/db (a * b) = a.
pub(crate) fn mul_backward<T: Element>(f: &Function, inner: &mut GraphInner<T>) {
    let upstream = inner.grad(f.output);
    let a = inner.value(f.parents[0]);
    let b = inner.value(f.parents[1]);
    inner.acc_grad(f.parents[0], upstream * b);
    inner.acc_grad(f.parents[1], upstream * a);
}

/// Builds the derived node for `a + b`, computing the value eagerly.
pub fn add_op<'g, T: Element>(a: Tensor<'g, T>, b: Tensor<'g, T>) -> Tensor<'g, T> {
    let graph = a.same_graph(b);
    let mut inner = graph.inner.borrow_mut();
    let value = inner.value(a.id()) + inner.value(b.id());
    let id = inner.push_derived(value, FunctionKind::Add, vec![a.id(), b.id()]);
    drop(inner);
    Tensor::from_parts(graph, id)
}

/// Builds the derived node for `a * b`, computing the value eagerly.
pub fn mul_op<'g, T: Element>(a: Tensor<'g, T>, b: Tensor<'g, T>) -> Tensor<'g, T> {
    let graph = a.same_graph(b);
    let mut inner = graph.inner.borrow_mut();
    let value = inner.value(a.id()) * inner.value(b.id());
    let id = inner.push_derived(value, FunctionKind::Mul, vec![a.id(), b.id()]);
    drop(inner);
    Tensor::from_parts(graph, id)
}

/// `a - b` lowers to `a + b * (-1)`.
///
/// The `-1` literal goes through the graph's constant cache, and the
/// gradient behavior falls out of the Add and Mul rules.
pub fn sub_op<'g, T: Element>(a: Tensor<'g, T>, b: Tensor<'g, T>) -> Tensor<'g, T> {
    let graph = a.same_graph(b);
    let neg_one = graph.constant(-T::one());
    add_op(a, mul_op(b, neg_one))
}

impl<'g, T: Element> Add for Tensor<'g, T> {
    type Output = Tensor<'g, T>;

    fn add(self, rhs: Self) -> Self::Output {
        add_op(self, rhs)
    }
}

impl<'g, T: Element> Mul for Tensor<'g, T> {
    type Output = Tensor<'g, T>;

    fn mul(self, rhs: Self) -> Self::Output {
        mul_op(self, rhs)
    }
}

impl<'g, T: Element> Sub for Tensor<'g, T> {
    type Output = Tensor<'g, T>;

    fn sub(self, rhs: Self) -> Self::Output {
        sub_op(self, rhs)
    }
}

// Scalar-literal convenience forms: the bare value is resolved through the
// graph's constant cache, then composed as an ordinary tensor operand.

impl<'g, T: Element> Add<T> for Tensor<'g, T> {
    type Output = Tensor<'g, T>;

    fn add(self, rhs: T) -> Self::Output {
        add_op(self, self.graph().constant(rhs))
    }
}

impl<'g, T: Element> Mul<T> for Tensor<'g, T> {
    type Output = Tensor<'g, T>;

    fn mul(self, rhs: T) -> Self::Output {
        mul_op(self, self.graph().constant(rhs))
    }
}

impl<'g, T: Element> Sub<T> for Tensor<'g, T> {
    type Output = Tensor<'g, T>;

    fn sub(self, rhs: T) -> Self::Output {
        sub_op(self, self.graph().constant(rhs))
    }
}
