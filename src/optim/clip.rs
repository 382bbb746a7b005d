//! Gradient clipping utilities

use crate::Tensor;

/// Clip gradients by global norm
///
/// Computes the global norm of all gradients and scales them down if the norm
/// exceeds max_norm. This prevents exploding gradients while preserving the
/// relative magnitudes of gradients across parameters.
///
/// # Returns
/// The actual global norm before clipping
pub fn clip_grad_norm(params: &mut [Tensor], max_norm: f32) -> f32 {
    let mut total_norm_sq = 0.0;

    for param in params.iter() {
        if let Some(grad) = param.grad() {
            let grad_norm_sq: f32 = grad.iter().map(|&g| g * g).sum();
            total_norm_sq += grad_norm_sq;
        }
    }

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;

        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                param.set_grad(grad * clip_coef);
            }
        }
    }

    global_norm
}

/// Clamp each gradient element to `[-clip, clip]`
///
/// Element-wise companion to [`clip_grad_norm`]: cruder, but bounds every
/// coordinate of the update individually, which matters when a single
/// coordinate blows up inside an unrolled training step.
pub fn clip_grad_value(params: &mut [Tensor], clip: f32) {
    for param in params.iter_mut() {
        if let Some(grad) = param.grad() {
            param.set_grad(grad.mapv(|g| g.clamp(-clip, clip)));
        }
    }
}
