// src/tensor/debug.rs
use std::fmt;

use crate::tensor::Tensor;
use crate::types::Element;

// Manual implementation of Debug: renders the element-type tag, the (always
// empty) shape and the current value/gradient. Diagnostics only.
impl<'g, T: Element> fmt::Debug for Tensor<'g, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.graph().inner.borrow();
        let node = &inner.nodes[self.id().index()];
        write!(
            f,
            "Tensor<{:?}>(shape={:?}, value={:?}, grad={:?}, ",
            T::DTYPE,
            self.shape(),
            node.value,
            node.grad,
        )?;
        match &node.grad_fn {
            Some(grad_fn) => write!(f, "grad_fn={:?})", grad_fn.kind),
            None => write!(f, "leaf)"),
        }
    }
}
