//! Generator network for unrolled teaching

use crate::autograd::{add, linear, mul, relu, tanh, Tensor};
use ndarray::Array1;
use rand::Rng;

/// Two-layer generator producing a synthetic example
///
/// The input is the conditioning vector (student weight state ⊕ real example
/// ⊕ one-hot label); the tanh output is affinely mapped into the dataset's
/// per-dimension `[lo, hi]` box so generated examples always live in the
/// observed data range.
pub struct GeneratorNet {
    w1: Tensor,
    w2: Tensor,
    in_dim: usize,
    hidden: usize,
    out_dim: usize,
    mid: Array1<f32>,
    half_span: Array1<f32>,
}

impl GeneratorNet {
    /// Create a generator with Xavier-uniform weights
    ///
    /// `lo`/`hi` are the per-dimension output bounds (the dataset's feature
    /// min/max).
    ///
    /// # Panics
    /// Panics if the bound vectors do not match `out_dim`.
    pub fn new<R: Rng>(
        in_dim: usize,
        hidden: usize,
        out_dim: usize,
        lo: Array1<f32>,
        hi: Array1<f32>,
        rng: &mut R,
    ) -> Self {
        assert_eq!(lo.len(), out_dim, "lower bound size mismatch");
        assert_eq!(hi.len(), out_dim, "upper bound size mismatch");

        let limit1 = (6.0 / (in_dim + hidden) as f32).sqrt();
        let w1 = Array1::from_iter((0..hidden * in_dim).map(|_| rng.random_range(-limit1..limit1)));
        let limit2 = (6.0 / (hidden + out_dim) as f32).sqrt();
        let w2 =
            Array1::from_iter((0..out_dim * hidden).map(|_| rng.random_range(-limit2..limit2)));

        let half_span = (&hi - &lo) * 0.5;
        let mid = &lo + &half_span;

        Self {
            w1: Tensor::new(w1, true),
            w2: Tensor::new(w2, true),
            in_dim,
            hidden,
            out_dim,
            mid,
            half_span,
        }
    }

    /// Conditioning input dimension
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Output (synthetic example) dimension
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Forward pass for a single conditioning vector
    pub fn forward(&self, input: &Tensor) -> Tensor {
        let h = relu(&linear(input, &self.w1, 1, self.in_dim, self.hidden));
        let z = tanh(&linear(&h, &self.w2, 1, self.hidden, self.out_dim));

        // mid + tanh(z) * half_span keeps the output inside [lo, hi]
        let half_span = Tensor::new(self.half_span.clone(), false);
        let mid = Tensor::new(self.mid.clone(), false);
        add(&mul(&z, &half_span), &mid)
    }

    /// Trainable parameter handles (shared storage)
    pub fn parameters(&self) -> Vec<Tensor> {
        vec![self.w1.clone(), self.w2.clone()]
    }

    /// Clear accumulated parameter gradients
    pub fn zero_grad(&self) {
        self.w1.zero_grad();
        self.w2.zero_grad();
    }
}
