//! Example difficulty and usefulness scores
//!
//! Both scores are functions of the student's weight gradient on the
//! candidate, returned as graph nodes so callers can differentiate them
//! again with respect to the candidate's data or label. Every evaluation
//! clears the student's gradient buffer and then deposits the fresh
//! first-order gradient into it; callers composing score evaluations must
//! not rely on the buffer surviving across calls.

use crate::autograd::{add, dot, norm_sq, scale, sub, Tensor};
use crate::model::{LinearStudent, TeacherModel};

/// Squared L2 norm of the student's weight gradient on `(x, y)`, unscaled
///
/// A loss with no dependency on the weight yields a zero gradient and a
/// valid zero score, never an error.
pub fn difficulty(student: &LinearStudent, x: &Tensor, y: &Tensor, batch: usize) -> Tensor {
    student.clear_gradients();
    let g = student.weight_grad(x, y, batch);
    norm_sq(&g)
}

/// Inner product of the weight-to-target gap and the student's weight
/// gradient on `(x, y)`, unscaled
pub fn usefulness(
    student: &LinearStudent,
    teacher_weight: &Tensor,
    x: &Tensor,
    y: &Tensor,
    batch: usize,
) -> Tensor {
    student.clear_gradients();
    let g = student.weight_grad(x, y, batch);
    let gap = sub(student.weight(), teacher_weight);
    dot(&gap, &g)
}

/// Difficulty scaled by lr², how hard an example currently is
pub struct ExampleDifficulty<'a> {
    student: &'a LinearStudent,
    lr: f32,
}

impl<'a> ExampleDifficulty<'a> {
    /// Capture the student and its current learning rate
    pub fn new(student: &'a LinearStudent) -> Self {
        Self {
            student,
            lr: student.lr(),
        }
    }

    /// Evaluate lr²·‖∂loss/∂W‖² as a graph node
    pub fn forward(&self, x: &Tensor, y: &Tensor, batch: usize) -> Tensor {
        scale(&difficulty(self.student, x, y, batch), self.lr * self.lr)
    }
}

/// Usefulness scaled by 2·lr, how much an example closes the gap to the
/// target hypothesis
pub struct ExampleUsefulness<'a> {
    student: &'a LinearStudent,
    teacher_weight: Tensor,
    lr: f32,
}

impl<'a> ExampleUsefulness<'a> {
    /// Capture the student, the teacher's target weights, and the current
    /// learning rate
    pub fn new(student: &'a LinearStudent, teacher: &TeacherModel) -> Self {
        Self {
            student,
            teacher_weight: teacher.as_tensor(),
            lr: student.lr(),
        }
    }

    /// Evaluate 2·lr·⟨W − w_star, ∂loss/∂W⟩ as a graph node
    pub fn forward(&self, x: &Tensor, y: &Tensor, batch: usize) -> Tensor {
        scale(
            &usefulness(self.student, &self.teacher_weight, x, y, batch),
            2.0 * self.lr,
        )
    }
}

/// Combined teaching score: difficulty − usefulness
///
/// Negative values mean the example helps convergence; the selector and the
/// synthesis loops minimize this quantity.
pub struct ScoreLoss<'a> {
    difficulty: ExampleDifficulty<'a>,
    usefulness: ExampleUsefulness<'a>,
}

impl<'a> ScoreLoss<'a> {
    /// Build the combinator for a student/teacher pair
    pub fn new(student: &'a LinearStudent, teacher: &TeacherModel) -> Self {
        Self {
            difficulty: ExampleDifficulty::new(student),
            usefulness: ExampleUsefulness::new(student, teacher),
        }
    }

    /// The scalar score difficulty − usefulness
    pub fn eval(&self, x: &Tensor, y: &Tensor, batch: usize) -> f32 {
        self.difficulty.forward(x, y, batch).data()[0]
            - self.usefulness.forward(x, y, batch).data()[0]
    }

    /// The synthesis objective difficulty + usefulness as a graph node
    ///
    /// The inner loop ascends the score-improving direction by descending
    /// this objective's negated gradient.
    pub fn objective(&self, x: &Tensor, y: &Tensor, batch: usize) -> Tensor {
        add(
            &self.difficulty.forward(x, y, batch),
            &self.usefulness.forward(x, y, batch),
        )
    }
}

/// The teaching score of a candidate `(x, y)` for a student/teacher pair
pub fn score(
    student: &LinearStudent,
    teacher: &TeacherModel,
    x: &Tensor,
    y: &Tensor,
    batch: usize,
) -> f32 {
    ScoreLoss::new(student, teacher).eval(x, y, batch)
}
