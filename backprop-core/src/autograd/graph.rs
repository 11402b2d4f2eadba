//! Topological ordering of the computation graph and the backward driver.

use log::{debug, trace};

use crate::error::BackpropError;
use crate::graph::{Graph, GraphInner, TensorId};
use crate::types::Element;

/// Builds a dependency-ordered visitation sequence from `root`.
///
/// Depth-first postorder over producer->parent edges, visiting each node
/// exactly once (identity-keyed), emitting a node only after all of its
/// ancestors: the result runs leaves-toward-root. Uses an explicit work
/// stack so traversal depth is bounded by the heap, not the call stack.
pub(crate) fn topological_sort<T: Element>(
    inner: &GraphInner<T>,
    root: TensorId,
) -> Vec<TensorId> {
    let mut visited = vec![false; inner.nodes.len()];
    let mut order = Vec::new();
    // (node, parents_expanded): a node is emitted on its second pop, once
    // every parent below it has been emitted.
    let mut stack = vec![(root, false)];

    while let Some((id, parents_expanded)) = stack.pop() {
        if parents_expanded {
            order.push(id);
            continue;
        }
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;
        trace!("topological_sort: visiting node {:?}", id);
        stack.push((id, true));
        if let Some(grad_fn) = &inner.nodes[id.index()].grad_fn {
            for &parent in &grad_fn.parents {
                if !visited[parent.index()] {
                    stack.push((parent, false));
                }
            }
        }
    }
    order
}

/// Runs the backward pass from `root` through every reachable node.
///
/// Walks the reversed topological order (root first, leaves last) and
/// invokes each visited node's producer backward step once. The ordering
/// guarantees a node's gradient is fully accumulated before its own
/// producer propagates it upstream, which is what makes diamond-shaped
/// graphs come out right.
pub(crate) fn backward<T: Element>(graph: &Graph<T>, root: TensorId) -> Result<(), BackpropError> {
    let mut inner = graph.inner.borrow_mut();
    if inner.grad(root) == T::zero() {
        return Err(BackpropError::UnseededBackward);
    }

    let order = topological_sort(&inner, root);
    debug!(
        "backward: {} node(s) reachable from {:?}",
        order.len(),
        root
    );

    for &id in order.iter().rev() {
        // Leaves terminate their branch: nothing further upstream.
        if let Some(grad_fn) = inner.nodes[id.index()].grad_fn.clone() {
            grad_fn.backward(&mut inner);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topological_sort_simple() {
        let graph = Graph::new();
        let x = graph.tensor(1.0_f32);
        let y = graph.tensor(2.0_f32);
        let z = x + y;

        let inner = graph.inner.borrow();
        let order = topological_sort(&inner, z.id());

        assert_eq!(order.len(), 3);
        // z last; both operands before it.
        assert_eq!(*order.last().unwrap(), z.id());
        let pos = |id| order.iter().position(|&o| o == id).unwrap();
        assert!(pos(x.id()) < pos(z.id()));
        assert!(pos(y.id()) < pos(z.id()));
    }

    #[test]
    fn test_topological_sort_shared_node_visited_once() {
        let graph = Graph::new();
        let x = graph.tensor(3.0_f32);
        let z = x * x;

        let inner = graph.inner.borrow();
        let order = topological_sort(&inner, z.id());
        assert_eq!(order.len(), 2, "x must appear exactly once");
    }

    #[test]
    fn test_topological_sort_ignores_unreachable_nodes() {
        let graph = Graph::new();
        let x = graph.tensor(1.0_f32);
        let y = graph.tensor(2.0_f32);
        let _unrelated = graph.tensor(9.0_f32) * graph.tensor(8.0_f32);
        let z = x + y;

        let inner = graph.inner.borrow();
        let order = topological_sort(&inner, z.id());
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_backward_unseeded_is_an_error() {
        let graph = Graph::new();
        let x = graph.tensor(1.0_f32);
        let y = graph.tensor(2.0_f32);
        let z = x + y;
        assert_eq!(z.backward(), Err(BackpropError::UnseededBackward));
        assert_eq!(x.grad(), 0.0);
    }

    #[test]
    fn test_backward_on_seeded_leaf_is_noop() {
        let graph = Graph::new();
        let x = graph.tensor(1.0_f32);
        x.set_grad(1.0);
        x.backward().unwrap();
        assert_eq!(x.grad(), 1.0);
    }

    #[test]
    fn test_seed_scales_gradients_linearly() {
        let graph = Graph::new();
        let a = graph.tensor(4.0_f64);
        let b = graph.tensor(5.5_f64);
        let product = a * b;
        product.set_grad(2.0);
        product.backward().unwrap();
        assert_eq!(a.grad(), 11.0);
        assert_eq!(b.grad(), 8.0);
    }

    #[test]
    fn test_leaf_double_use_accumulates() {
        // z = x * x: both parent slots are the same node, so its gradient
        // must sum both contributions: dz/dx = 2x.
        let graph = Graph::new();
        let x = graph.tensor(3.0_f64);
        let z = x * x;
        z.set_grad(1.0);
        z.backward().unwrap();
        assert_eq!(x.grad(), 6.0);
    }

    #[test]
    fn test_derived_shared_node_fully_accumulated_before_propagation() {
        // m = a * b feeds two consumers; m's producer must run only after
        // both consumers contributed. A traversal without topological
        // ordering propagates a partial gradient and lands on 24 instead.
        let graph = Graph::new();
        let a = graph.tensor(2.0_f64);
        let b = graph.tensor(3.0_f64);
        let c = graph.tensor(1.0_f64);
        let d = graph.tensor(2.0_f64);
        let m = a * b; // 6
        let p = m + c; // 7
        let q = m + d; // 8
        let z = p * q; // 56

        z.set_grad(1.0);
        z.backward().unwrap();

        assert_eq!(m.grad(), 15.0); // q + p
        assert_eq!(a.grad(), 45.0); // 15 * b
        assert_eq!(b.grad(), 30.0); // 15 * a
        assert_eq!(c.grad(), 8.0);
        assert_eq!(d.grad(), 7.0);
    }

    #[test]
    fn test_repeated_backward_accumulates_until_reset() {
        let graph = Graph::new();
        let a = graph.tensor(4.0_f32);
        let b = graph.tensor(5.5_f32);
        let product = a * b;

        product.set_grad(1.0);
        product.backward().unwrap();
        assert_eq!(a.grad(), 5.5);

        // No implicit reset: a second pass keeps accumulating.
        product.set_grad(1.0);
        product.backward().unwrap();
        assert_eq!(a.grad(), 11.0);

        graph.zero_grads();
        product.set_grad(1.0);
        product.backward().unwrap();
        assert_eq!(a.grad(), 5.5);
    }

    #[test]
    fn test_deep_chain_does_not_overflow_the_stack() {
        let graph = Graph::new();
        let x = graph.tensor(0.0_f64);
        let mut out = x;
        for _ in 0..200_000 {
            out = out + 1.0;
        }
        out.set_grad(1.0);
        out.backward().unwrap();
        assert_eq!(x.grad(), 1.0);
    }
}
