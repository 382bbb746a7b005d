//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adam optimizer
///
/// Adaptive moment estimation with bias-corrected first and second moment
/// estimates:
///
/// ```text
/// m_t = β1·m_{t-1} + (1-β1)·g
/// v_t = β2·v_{t-1} + (1-β2)·g²
/// θ_t = θ_{t-1} - lr_t · m_t / (√v_t + ε),   lr_t = lr·√(1-β2ᵗ)/(1-β1ᵗ)
/// ```
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Create Adam with default parameters
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    /// Initialize moments if needed
    fn ensure_moments(&mut self, params: &[Tensor]) {
        if self.m.is_empty() {
            self.m = params.iter().map(|_| None).collect();
            self.v = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_moments(params);
        self.t += 1;

        // Bias correction folded into the step size
        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                // m_t = β1 * m_{t-1} + (1 - β1) * g
                let m_t = if let Some(m) = &self.m[i] {
                    m * self.beta1 + &grad * (1.0 - self.beta1)
                } else {
                    &grad * (1.0 - self.beta1)
                };

                // v_t = β2 * v_{t-1} + (1 - β2) * g²
                let grad_sq = &grad * &grad;
                let v_t = if let Some(v) = &self.v[i] {
                    v * self.beta2 + &grad_sq * (1.0 - self.beta2)
                } else {
                    &grad_sq * (1.0 - self.beta2)
                };

                let update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
                *param.data_mut() = param.data() - &update;

                self.m[i] = Some(m_t);
                self.v[i] = Some(v_t);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quadratic_converges(mut opt: Adam, iterations: usize, threshold: f32) -> bool {
        let param = Tensor::from_vec(vec![3.0, -2.0, 1.5, -2.5], true);

        for _ in 0..iterations {
            let grad = param.data().mapv(|x| 2.0 * x);
            param.set_grad(grad);
            opt.step(&mut [param.clone()]);
        }

        param.data().iter().all(|&v| v.abs() < threshold)
    }

    proptest! {
        #[test]
        fn prop_adam_converges_quadratic(lr in 0.05f32..0.5) {
            prop_assert!(quadratic_converges(Adam::default_params(lr), 100, 1.5));
        }
    }

    #[test]
    fn test_adam_first_step_size() {
        // With bias correction the first step has magnitude ≈ lr
        let mut opt = Adam::default_params(0.1);
        let param = Tensor::from_vec(vec![1.0], true);
        param.set_grad(ndarray::arr1(&[0.5]));

        opt.step(&mut [param.clone()]);

        assert!((param.data()[0] - 0.9).abs() < 1e-3);
    }

    #[test]
    fn test_adam_no_grad_is_noop() {
        let mut opt = Adam::default_params(0.1);
        let param = Tensor::from_vec(vec![1.0, 2.0], true);

        opt.step(&mut [param.clone()]);

        assert_eq!(param.data().to_vec(), vec![1.0, 2.0]);
    }
}
