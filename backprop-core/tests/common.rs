use backprop_core::{BackpropError, Element, Tensor};

// Seed the output with 1 and run the backward pass. Shared by the scenario
// test files; allow(dead_code) because usage across test crates isn't
// detected easily.
#[allow(dead_code)]
pub(crate) fn seed_and_backward<T: Element>(output: Tensor<'_, T>) -> Result<(), BackpropError> {
    output.set_grad(T::one());
    output.backward()
}
