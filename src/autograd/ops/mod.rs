//! Autograd operations with backward passes

mod activations;
mod basic;
mod linear;

pub use activations::{relu, tanh};
pub use basic::{add, dot, mul, norm_sq, scale, sub, sum};
pub use linear::{linear, mse_weight_grad};
