//! Finite-difference validation of analytic gradients.
//!
//! Perturbs each leaf input by a small epsilon, replays the forward pass,
//! and compares the central-difference slope against the gradient the
//! backward pass accumulated.

use thiserror::Error;

use crate::error::BackpropError;
use crate::tensor::Tensor;
use crate::types::Element;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("gradient check failed for input {input_index}: analytical grad {analytical_grad} != numerical grad {numerical_grad} (difference {difference})")]
    GradientMismatch {
        input_index: usize,
        analytical_grad: f64, // f64 for precision regardless of element type
        numerical_grad: f64,
        difference: f64,
    },

    #[error("backward pass failed during gradient check: {0}")]
    BackwardPassError(BackpropError),

    #[error("gradient check inputs must be leaf nodes (input {input_index} has a producer)")]
    InputNotLeaf { input_index: usize },

    #[error("numerical gradient is NaN or infinite for input {input_index} (loss+: {loss_plus}, loss-: {loss_minus})")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("analytical gradient is NaN or infinite for input {input_index}: {value}")]
    AnalyticalGradNaNOrInfinite { input_index: usize, value: f64 },
}

impl From<BackpropError> for GradCheckError {
    fn from(err: BackpropError) -> Self {
        GradCheckError::BackwardPassError(err)
    }
}

fn as_f64<T: Element>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// Checks analytical gradients of `output` with respect to each leaf in
/// `inputs` against central finite differences.
///
/// Clears all gradients, seeds the output with 1 and runs a backward pass,
/// then perturbs each input by `±epsilon`, replays the forward computation
/// and compares slopes within `tolerance` (absolute). Inputs are restored
/// afterwards.
///
/// # Errors
/// Returns a [`GradCheckError`] describing the first mismatch, NaN/infinite
/// gradient, non-leaf input, or backward failure.
pub fn check_grad<'g, T: Element>(
    output: Tensor<'g, T>,
    inputs: &[Tensor<'g, T>],
    epsilon: T,
    tolerance: T,
) -> Result<(), GradCheckError> {
    for (i, input) in inputs.iter().enumerate() {
        if !input.is_leaf() {
            return Err(GradCheckError::InputNotLeaf { input_index: i });
        }
    }

    let graph = output.graph();

    // Analytical gradients from a fresh backward pass.
    graph.zero_grads();
    output.set_grad(T::one());
    output.backward()?;
    let analytical_grads: Vec<T> = inputs.iter().map(|t| t.grad()).collect();

    let two = T::one() + T::one();
    for (i, input) in inputs.iter().enumerate() {
        let original = input.item();

        input.set_item(original + epsilon);
        graph.recompute();
        let loss_plus = output.item();

        input.set_item(original - epsilon);
        graph.recompute();
        let loss_minus = output.item();

        // Restore before any early return below.
        input.set_item(original);
        graph.recompute();

        let numerical_grad = (loss_plus - loss_minus) / (two * epsilon);
        let analytical_grad = analytical_grads[i];

        if !numerical_grad.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                input_index: i,
                loss_plus: as_f64(loss_plus),
                loss_minus: as_f64(loss_minus),
            });
        }
        if !analytical_grad.is_finite() {
            return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                input_index: i,
                value: as_f64(analytical_grad),
            });
        }

        if !analytical_grad.abs_diff_eq(&numerical_grad, tolerance) {
            return Err(GradCheckError::GradientMismatch {
                input_index: i,
                analytical_grad: as_f64(analytical_grad),
                numerical_grad: as_f64(numerical_grad),
                difference: as_f64((analytical_grad - numerical_grad).abs()),
            });
        }
    }

    Ok(())
}
