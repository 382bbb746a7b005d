//! Linear student model

use crate::autograd::{linear, mse_weight_grad, norm_sq, scale, sub, Tensor};
use crate::data::TeachingSet;
use crate::optim::{Optimizer, SGD};
use ndarray::Array1;
use rand::Rng;

/// A linear predictor trained with SGD under MSE loss
///
/// The weight is an out_dim×in_dim matrix stored flat. Besides the usual
/// forward/loss/update surface, the student exposes [`Self::weight_grad`],
/// which returns its weight gradient for a candidate example *as a graph
/// node*: the teaching scores built on it stay differentiable with respect
/// to the candidate. Every gradient evaluation overwrites the student's
/// gradient buffer; callers needing pristine state clear it first.
pub struct LinearStudent {
    weight: Tensor,
    optim: SGD,
    in_dim: usize,
    out_dim: usize,
}

impl LinearStudent {
    /// Create a student with Xavier-uniform initial weights
    pub fn new<R: Rng>(in_dim: usize, out_dim: usize, lr: f32, rng: &mut R) -> Self {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let weight =
            Array1::from_iter((0..out_dim * in_dim).map(|_| rng.random_range(-limit..limit)));

        Self {
            weight: Tensor::new(weight, true),
            optim: SGD::new(lr, 0.0),
            in_dim,
            out_dim,
        }
    }

    /// Create a student from explicit initial weights
    ///
    /// # Panics
    /// Panics if the weight length is not `out_dim * in_dim`.
    pub fn from_weights(weights: Array1<f32>, in_dim: usize, out_dim: usize, lr: f32) -> Self {
        assert_eq!(weights.len(), out_dim * in_dim, "weight size mismatch");
        Self {
            weight: Tensor::new(weights, true),
            optim: SGD::new(lr, 0.0),
            in_dim,
            out_dim,
        }
    }

    /// Input dimension
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Output dimension
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Current learning rate
    pub fn lr(&self) -> f32 {
        self.optim.lr()
    }

    /// Set the learning rate
    pub fn set_lr(&mut self, lr: f32) {
        self.optim.set_lr(lr);
    }

    /// The trainable weight tensor
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Copy of the current weight values
    pub fn weight_values(&self) -> Array1<f32> {
        self.weight.data()
    }

    /// Weight values rescaled to unit L2 norm (zero weights pass through)
    pub fn normalized_weight(&self) -> Array1<f32> {
        let w = self.weight.data();
        let norm = w.dot(&w).sqrt();
        if norm > 0.0 {
            w / norm
        } else {
            w
        }
    }

    /// Clear the accumulated weight gradient
    pub fn clear_gradients(&self) {
        self.weight.zero_grad();
    }

    /// Batched forward pass (batch×in_dim flat input, batch×out_dim output)
    pub fn forward(&self, x: &Tensor, batch: usize) -> Tensor {
        linear(x, &self.weight, batch, self.in_dim, self.out_dim)
    }

    /// MSE loss between a prediction and a target, as a scalar graph node
    pub fn loss(&self, pred: &Tensor, target: &Tensor, batch: usize) -> Tensor {
        scale(
            &norm_sq(&sub(pred, target)),
            1.0 / (batch * self.out_dim) as f32,
        )
    }

    /// The weight gradient of the MSE loss on `(x, y)` as a graph node
    ///
    /// Also deposits the detached gradient value into the weight's gradient
    /// buffer, so a subsequent optimizer step sees the same first-order
    /// gradient an ordinary backward pass would have produced.
    pub fn weight_grad(&self, x: &Tensor, y: &Tensor, batch: usize) -> Tensor {
        let g = mse_weight_grad(x, &self.weight, y, batch, self.in_dim, self.out_dim);
        self.weight.set_grad(g.data());
        g
    }

    /// One SGD training step on a single example batch
    pub fn update(&mut self, x: &Array1<f32>, y: &Array1<f32>) {
        assert_eq!(x.len() % self.in_dim, 0, "input size mismatch");
        let batch = x.len() / self.in_dim;
        assert_eq!(y.len(), batch * self.out_dim, "target size mismatch");

        let x_t = Tensor::new(x.clone(), false);
        let y_t = Tensor::new(y.clone(), false);

        self.clear_gradients();
        let _ = self.weight_grad(&x_t, &y_t, batch);
        self.optim.step(&mut [self.weight.clone()]);
    }

    /// Restore saved initial weights (fair cross-condition comparison)
    pub fn reset(&mut self, weights: &Array1<f32>) {
        assert_eq!(
            weights.len(),
            self.out_dim * self.in_dim,
            "weight size mismatch"
        );
        *self.weight.data_mut() = weights.clone();
        self.weight.zero_grad();
    }

    /// Classification accuracy over a dataset
    ///
    /// Thresholds at 0.5 for a single output, takes the argmax otherwise.
    pub fn accuracy(&self, set: &TeachingSet) -> f32 {
        let n = set.len();
        let x = set.batch_data(0, n);
        let pred = self.forward(&x, n).data();

        let mut correct = 0usize;
        for row in 0..n {
            let predicted = if self.out_dim == 1 {
                usize::from(pred[row] > 0.5)
            } else {
                let outputs = &pred.as_slice().expect("prediction is contiguous")
                    [row * self.out_dim..(row + 1) * self.out_dim];
                outputs
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.total_cmp(b))
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            };
            if predicted == set.label(row) {
                correct += 1;
            }
        }

        correct as f32 / n as f32
    }
}
