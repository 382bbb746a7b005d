//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over flat `f32` tensors
//! using a computational graph with gradient tape. The op library is small
//! and purpose-built: besides the usual arithmetic ops it exposes
//! [`mse_weight_grad`], which materializes a linear model's weight gradient
//! *as a graph node*, so losses defined on that gradient (example difficulty
//! and usefulness) can themselves be differentiated with a single backward
//! pass.
//!
//! Propagation is recursive from the output op; interior nodes must not fan
//! out to multiple consumers (fused ops such as [`norm_sq`] exist for that
//! reason). Leaf tensors may be consumed by any number of ops.

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::BackwardOp;
pub use ops::{add, dot, linear, mse_weight_grad, mul, norm_sq, relu, scale, sub, sum, tanh};
pub use tensor::Tensor;

/// Perform backward pass on a tensor
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        // Initialize with ones for scalar loss
        let ones = ndarray::Array1::ones(tensor.len());
        tensor.set_grad(ones);
    }

    if let Some(op) = tensor.backward_op() {
        op.backward();
    }
}
