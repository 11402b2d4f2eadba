//! The node arena owning one computation session.
//!
//! All nodes live in a single `Vec` and are addressed through stable integer
//! handles ([`TensorId`]). Producer records store handles, never addresses,
//! so growing the arena can never dangle a parent reference.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::ops::{Function, FunctionKind};
use crate::tensor::Tensor;
use crate::types::Element;

/// Stable handle to one node in a [`Graph`] arena.
///
/// Identity (not value equality) of a node is the identity of its handle
/// within its owning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorId(pub(crate) usize);

impl TensorId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Internal storage for one node: the scalar payload, its gradient
/// accumulator, and the producer record for derived nodes.
///
/// `grad` starts at zero and is only ever written by explicit seeding,
/// accumulation during backward, or [`Graph::zero_grads`].
#[derive(Debug)]
pub(crate) struct TensorData<T> {
    pub(crate) value: T,
    pub(crate) grad: T,
    /// `None` for leaf nodes created directly from a value.
    pub(crate) grad_fn: Option<Function>,
}

#[derive(Debug)]
pub(crate) struct GraphInner<T: Element> {
    pub(crate) nodes: Vec<TensorData<T>>,
    /// Memoized leaf nodes for bare scalar literals, keyed by bit pattern.
    constants: HashMap<u64, TensorId>,
}

impl<T: Element> GraphInner<T> {
    pub(crate) fn push_leaf(&mut self, value: T) -> TensorId {
        let id = TensorId(self.nodes.len());
        self.nodes.push(TensorData {
            value,
            grad: T::zero(),
            grad_fn: None,
        });
        id
    }

    /// Pushes a derived node. The producer's output back-handle is attached
    /// here, as part of construction, so it can never be observed unset.
    pub(crate) fn push_derived(
        &mut self,
        value: T,
        kind: FunctionKind,
        parents: Vec<TensorId>,
    ) -> TensorId {
        let id = TensorId(self.nodes.len());
        let grad_fn = Function::new(kind, parents, id);
        self.nodes.push(TensorData {
            value,
            grad: T::zero(),
            grad_fn: Some(grad_fn),
        });
        id
    }

    /// Returns the memoized leaf for `value`, creating it on first use.
    pub(crate) fn get_or_create_constant(&mut self, value: T) -> TensorId {
        let key = value.cache_key();
        if let Some(&id) = self.constants.get(&key) {
            return id;
        }
        let id = self.push_leaf(value);
        self.constants.insert(key, id);
        id
    }

    pub(crate) fn value(&self, id: TensorId) -> T {
        self.nodes[id.index()].value
    }

    pub(crate) fn grad(&self, id: TensorId) -> T {
        self.nodes[id.index()].grad
    }

    /// Accumulates into the gradient; never overwrites. Required for
    /// correctness whenever a node is consumed by more than one operation.
    pub(crate) fn acc_grad(&mut self, id: TensorId, amount: T) {
        self.nodes[id.index()].grad += amount;
    }
}

/// Arena owning every node of one computation session.
///
/// Single-threaded by design: construction and backward passes are
/// synchronous and share no state across graphs. Each graph also owns its
/// constant cache, so memoized literals live exactly as long as the session
/// that created them.
pub struct Graph<T: Element> {
    pub(crate) inner: RefCell<GraphInner<T>>,
}

impl<T: Element> Graph<T> {
    pub fn new() -> Self {
        Graph {
            inner: RefCell::new(GraphInner {
                nodes: Vec::new(),
                constants: HashMap::new(),
            }),
        }
    }

    /// Creates a leaf tensor holding `value` (gradient zero, no producer).
    pub fn tensor(&self, value: T) -> Tensor<'_, T> {
        let id = self.inner.borrow_mut().push_leaf(value);
        Tensor::from_parts(self, id)
    }

    /// Resolves a bare scalar literal through the constant cache.
    ///
    /// Idempotent: repeated calls with an equal value return the same
    /// memoized leaf node.
    pub fn constant(&self, value: T) -> Tensor<'_, T> {
        let id = self.inner.borrow_mut().get_or_create_constant(value);
        Tensor::from_parts(self, id)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resets every gradient accumulator in the arena to zero.
    ///
    /// Backward passes accumulate onto prior gradients; this is the explicit
    /// reset between passes.
    pub fn zero_grads(&self) {
        let mut inner = self.inner.borrow_mut();
        for node in inner.nodes.iter_mut() {
            node.grad = T::zero();
        }
    }

    /// Replays every producer's forward step, refreshing derived values
    /// after a leaf was mutated with [`Tensor::set_item`].
    ///
    /// Creation order is a valid topological order (parents always exist
    /// before their outputs), so a single linear pass suffices.
    pub fn recompute(&self) {
        let mut inner = self.inner.borrow_mut();
        for idx in 0..inner.nodes.len() {
            if let Some(grad_fn) = inner.nodes[idx].grad_fn.clone() {
                grad_fn.forward(&mut inner);
            }
        }
    }
}

impl<T: Element> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_creation() {
        let graph = Graph::new();
        let t = graph.tensor(5.5_f32);
        assert_eq!(t.item(), 5.5);
        assert_eq!(t.grad(), 0.0);
        assert!(t.is_leaf());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_constant_cache_is_idempotent() {
        let graph = Graph::new();
        let c1 = graph.constant(3.0_f32);
        let c2 = graph.constant(3.0_f32);
        assert_eq!(c1.id(), c2.id(), "equal literals must share one node");
        assert_eq!(graph.len(), 1);

        let c3 = graph.constant(4.0_f32);
        assert_ne!(c1.id(), c3.id());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_constant_cache_distinct_from_leaves() {
        let graph = Graph::new();
        // Plain leaves are never memoized, even for equal values.
        let a = graph.tensor(2.0_f32);
        let b = graph.tensor(2.0_f32);
        assert_ne!(a.id(), b.id());

        let c = graph.constant(2.0_f32);
        assert_ne!(a.id(), c.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn test_scalar_operand_reuses_cached_constant() {
        let graph = Graph::new();
        let a = graph.tensor(1.0_f32);
        let b = graph.tensor(2.0_f32);

        let before = graph.len();
        let _x = a * 3.0;
        let grew_once = graph.len();
        let _y = b * 3.0;
        // Second use of the literal adds only the derived node, not a new
        // constant leaf.
        assert_eq!(graph.len() - grew_once, 1);
        assert_eq!(grew_once - before, 2);
    }

    #[test]
    fn test_recompute_refreshes_derived_values() {
        let graph = Graph::new();
        let a = graph.tensor(2.0_f64);
        let b = graph.tensor(3.0_f64);
        let c = a * b;
        let d = c + a;
        assert_eq!(c.item(), 6.0);
        assert_eq!(d.item(), 8.0);

        a.set_item(5.0);
        // Derived values are stale until replayed.
        assert_eq!(c.item(), 6.0);
        graph.recompute();
        assert_eq!(c.item(), 15.0);
        assert_eq!(d.item(), 20.0);
    }

    #[test]
    fn test_zero_grads_resets_all_accumulators() {
        let graph = Graph::new();
        let a = graph.tensor(4.0_f32);
        let b = graph.tensor(5.5_f32);
        let product = a * b;
        product.set_grad(1.0);
        product.backward().unwrap();
        assert_eq!(a.grad(), 5.5);

        graph.zero_grads();
        assert_eq!(a.grad(), 0.0);
        assert_eq!(b.grad(), 0.0);
        assert_eq!(product.grad(), 0.0);
    }
}
