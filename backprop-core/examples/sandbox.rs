//! Scratchpad walking through a small expression end to end: build the
//! graph, inspect nodes with `{:?}`, run backward, print gradients.
//!
//! Run with `cargo run --example sandbox` (add `RUST_LOG=debug` for the
//! traversal log).

use backprop_core::Graph;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let graph = Graph::new();

    let t = graph.tensor(4.0_f32);
    let t2 = graph.tensor(5.5_f32);
    let t3 = t * t2;
    let t4 = graph.tensor(2.0_f32);
    let t5 = t3 + t4;
    let t6 = t5.tanh();

    println!("t  = {:?}", t);
    println!("t2 = {:?}", t2);
    println!("t3 = {:?}", t3);
    println!("t5 = {:?}", t5);
    println!("t6 = {:?}", t6);

    t6.set_grad(1.0);
    t6.backward()?;

    println!("\nafter backward:");
    println!("dL/dt  = {}", t.grad());
    println!("dL/dt2 = {}", t2.grad());
    println!("dL/dt4 = {}", t4.grad());

    // Difference via the derived a + b * (-1) form.
    let diff = t3 - t4;
    println!("\nt3 - t4 = {:?}", diff);

    Ok(())
}
