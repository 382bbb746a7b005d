//! Unrolled generator training
//!
//! Rather than solving an inner optimization per example, a generator
//! network learns to emit teaching examples directly. Each training step
//! unrolls one simulated student update and backpropagates the distance to
//! the target hypothesis through it, down into the generator's weights.

use crate::autograd::{backward, mse_weight_grad, norm_sq, scale, sub, Tensor};
use crate::config::UnrolledConfig;
use crate::data::TeachingSet;
use crate::model::{GeneratorNet, LinearStudent, TeacherModel};
use crate::optim::{clip_grad_norm, clip_grad_value, Adam, Optimizer};
use ndarray::Array1;
use rand::Rng;

/// Meta-optimizer that trains a [`GeneratorNet`] to teach a linear student
///
/// The generator is conditioned on the student's normalized weight state, a
/// real example, and its label. [`Self::fit_step`] improves the generator;
/// [`Self::teach_step`] uses it to move an actual student.
pub struct UnrolledTeacher {
    generator: GeneratorNet,
    optim: Adam,
    grad_clip: f32,
    value_clip: f32,
}

impl UnrolledTeacher {
    /// Build a generator sized for the student/dataset pair
    pub fn new<R: Rng>(
        student: &LinearStudent,
        set: &TeachingSet,
        cfg: &UnrolledConfig,
        rng: &mut R,
    ) -> Self {
        let w_len = student.out_dim() * student.in_dim();
        let in_dim = w_len + set.dim() + student.out_dim();
        let generator = GeneratorNet::new(
            in_dim,
            cfg.hidden,
            set.dim(),
            set.feature_min(),
            set.feature_max(),
            rng,
        );

        Self {
            generator,
            optim: Adam::new(cfg.lr, cfg.beta1, cfg.beta2, 1e-8),
            grad_clip: cfg.grad_clip,
            value_clip: cfg.value_clip,
        }
    }

    /// The trained generator
    pub fn generator(&self) -> &GeneratorNet {
        &self.generator
    }

    /// Conditioning vector: student weight state ⊕ real example ⊕ label
    fn conditioning(&self, student: &LinearStudent, x: &Array1<f32>, y: &Array1<f32>) -> Tensor {
        let w = student.normalized_weight();
        let mut input = Vec::with_capacity(w.len() + x.len() + y.len());
        input.extend(w.iter().copied());
        input.extend(x.iter().copied());
        input.extend(y.iter().copied());
        Tensor::from_vec(input, false)
    }

    /// One generator training step; returns the post-update distance to the
    /// target hypothesis
    ///
    /// Unrolls a single simulated SGD step `w' = w − lr·∇L` on a generated
    /// example and minimizes `‖w' − w_star‖²`. The student itself is not
    /// modified; its weights enter the unroll as constants.
    pub fn fit_step<R: Rng>(
        &mut self,
        student: &LinearStudent,
        teacher: &TeacherModel,
        set: &TeachingSet,
        rng: &mut R,
    ) -> f32 {
        let idx = rng.random_range(0..set.len());
        let x_real = set.row(idx);
        let y = set.one_hot(set.label(idx), student.out_dim());

        let input = self.conditioning(student, &x_real, &y);
        let synth = self.generator.forward(&input);

        // One simulated student update, kept differentiable in synth
        let w = student.weight().detach();
        let y_t = Tensor::new(y, false);
        let g = mse_weight_grad(&synth, &w, &y_t, 1, student.in_dim(), student.out_dim());
        let w_next = sub(&w, &scale(&g, student.lr()));

        let mut loss = norm_sq(&sub(&w_next, &teacher.as_tensor()));
        let loss_value = loss.data()[0];

        self.generator.zero_grad();
        backward(&mut loss, None);

        let mut params = self.generator.parameters();
        clip_grad_value(&mut params, self.value_clip);
        clip_grad_norm(&mut params, self.grad_clip);
        self.optim.step(&mut params);

        tracing::debug!(loss = loss_value, "generator fit step");
        loss_value
    }

    /// Generate an example for the student's current state and apply one
    /// real student update with it; returns the example and its label
    pub fn teach_step<R: Rng>(
        &self,
        student: &mut LinearStudent,
        set: &TeachingSet,
        rng: &mut R,
    ) -> (Array1<f32>, Array1<f32>) {
        let idx = rng.random_range(0..set.len());
        let x_real = set.row(idx);
        let y = set.one_hot(set.label(idx), student.out_dim());

        let input = self.conditioning(student, &x_real, &y);
        let synth = self.generator.forward(&input).data();
        student.update(&synth, &y);

        (synth, y)
    }
}
