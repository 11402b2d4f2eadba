use thiserror::Error;

/// Custom error type for the backprop engine.
#[derive(Error, Debug, Clone, PartialEq)] // PartialEq for easier testing
pub enum BackpropError {
    /// `backward()` was invoked before the output's gradient accumulator was
    /// seeded. An unseeded pass would silently produce all-zero gradients,
    /// so it is reported instead.
    #[error("backward called on an unseeded output: the gradient accumulator is still zero")]
    UnseededBackward,

    #[error("internal error: {0}")]
    InternalError(String),
}
