//! Optimizers for model parameters
//!
//! The per-coordinate Adam/AMSGrad loop that drives synthetic example
//! synthesis is not an [`Optimizer`]: it optimizes a candidate example
//! against a score gradient with freeze flags, and lives in
//! [`crate::teach::generate`].

mod adam;
mod clip;
mod optimizer;
mod sgd;

pub use adam::Adam;
pub use clip::{clip_grad_norm, clip_grad_value};
pub use optimizer::Optimizer;
pub use sgd::SGD;
