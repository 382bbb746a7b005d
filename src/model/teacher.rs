//! Teacher model holding the target hypothesis

use crate::model::LinearStudent;
use crate::Tensor;
use ndarray::Array1;

/// The target hypothesis `w_star` a student should converge to
///
/// Weights are rescaled to unit L2 norm on construction so the teacher is a
/// direction, not a magnitude; student weights are normalized the same way
/// before comparison. Immutable during student training.
#[derive(Debug, Clone)]
pub struct TeacherModel {
    w_star: Array1<f32>,
    in_dim: usize,
    out_dim: usize,
}

impl TeacherModel {
    /// Create a teacher from target weights (out_dim×in_dim, flat)
    ///
    /// # Panics
    /// Panics if the weight length is not `out_dim * in_dim`.
    pub fn new(weights: Array1<f32>, in_dim: usize, out_dim: usize) -> Self {
        assert_eq!(weights.len(), out_dim * in_dim, "weight size mismatch");

        let norm = weights.dot(&weights).sqrt();
        let w_star = if norm > 0.0 { weights / norm } else { weights };

        Self {
            w_star,
            in_dim,
            out_dim,
        }
    }

    /// Adopt a trained student's weights as the target hypothesis
    pub fn from_student(student: &LinearStudent) -> Self {
        Self::new(
            student.weight_values(),
            student.in_dim(),
            student.out_dim(),
        )
    }

    /// Input dimension
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Output dimension
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// The unit-norm target weights
    pub fn weight(&self) -> &Array1<f32> {
        &self.w_star
    }

    /// The target weights as a constant graph leaf
    pub fn as_tensor(&self) -> Tensor {
        Tensor::new(self.w_star.clone(), false)
    }

    /// Squared L2 distance from a student's unit-normalized weights
    pub fn weight_gap(&self, student: &LinearStudent) -> f32 {
        let w = student.normalized_weight();
        let diff = &self.w_star - &w;
        diff.dot(&diff)
    }
}
