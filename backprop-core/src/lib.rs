//! # backprop-core
//!
//! A minimal reverse-mode automatic-differentiation engine over scalar
//! values. A dynamic computation graph is built eagerly as expressions are
//! evaluated; a single backward traversal then computes the gradient of a
//! designated output with respect to every reachable node.
//!
//! All nodes of one computation live in a [`Graph`] arena and are addressed
//! through cheap `Copy` [`Tensor`] handles, so operations never hold raw
//! addresses into resizable storage.
//!
//! ```
//! use backprop_core::Graph;
//!
//! let graph = Graph::new();
//! let t = graph.tensor(4.0_f32);
//! let t2 = graph.tensor(5.5);
//! let product = t * t2;
//! assert_eq!(product.item(), 22.0);
//!
//! product.set_grad(1.0);
//! product.backward()?;
//! assert_eq!(t.grad(), 5.5);
//! assert_eq!(t2.grad(), 4.0);
//! # Ok::<(), backprop_core::BackpropError>(())
//! ```
//!
//! Gradients accumulate across backward passes and are never reset
//! implicitly; call [`Graph::zero_grads`] between passes when accumulation is
//! not wanted.

pub mod autograd;
pub mod error;
pub mod graph;
pub mod ops;
pub mod tensor;
pub mod types;

pub use autograd::{check_grad, GradCheckError};
pub use error::BackpropError;
pub use graph::{Graph, TensorId};
pub use tensor::Tensor;
pub use types::{DType, Element};

// Re-export traits required by public generic bounds
pub use num_traits;
