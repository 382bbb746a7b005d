//! Synthetic example and label synthesis
//!
//! The inner loop treats a candidate example (and optionally its label) as
//! the trainable quantity: each iteration rebuilds the score objective on
//! the current candidate, backpropagates through the student's weight
//! gradient, and moves every still-free coordinate with a per-coordinate
//! Adam or AMSGrad step. Coordinates freeze permanently once they leave
//! their feasible range; a run of bit-identical scores ends the loop early.

use crate::autograd::{backward, Tensor};
use crate::config::{InnerOptim, TeachingConfig};
use crate::data::TeachingSet;
use crate::model::{LinearStudent, TeacherModel};
use crate::teach::score::ScoreLoss;
use ndarray::Array1;
use rand::Rng;

// sqrt of f64 machine epsilon, the classic finite-difference epsilon
const ADAM_EPS: f32 = 1.490_116_1e-8;
const AMSGRAD_EPS: f32 = 1e-8;
const STAGNATION_LIMIT: u32 = 10;

/// Per-coordinate adaptive-moment optimizer with permanent freezing
///
/// Moment state is indexed by coordinate so frozen coordinates keep their
/// history without advancing it.
struct CoordinateOptimizer {
    variant: InnerOptim,
    alpha: f32,
    beta1: f32,
    beta2: f32,
    m: Vec<f32>,
    v: Vec<f32>,
    vhat: Vec<f32>,
    frozen: Vec<bool>,
}

impl CoordinateOptimizer {
    fn new(n: usize, variant: InnerOptim, alpha: f32, beta1: f32, beta2: f32) -> Self {
        Self {
            variant,
            alpha,
            beta1,
            beta2,
            m: vec![0.0; n],
            v: vec![0.0; n],
            vhat: vec![0.0; n],
            frozen: vec![false; n],
        }
    }

    fn is_frozen(&self, i: usize) -> bool {
        self.frozen[i]
    }

    fn freeze(&mut self, i: usize) {
        self.frozen[i] = true;
    }

    /// Update the moments for coordinate `i` with gradient `g` at iteration
    /// `t` (zero-based) and return the step to subtract
    fn step(&mut self, i: usize, g: f32, t: usize) -> f32 {
        match self.variant {
            InnerOptim::Adam => {
                self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
                self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
                let m_hat = self.m[i] / (1.0 - self.beta1.powi(t as i32 + 1));
                let v_hat = self.v[i] / (1.0 - self.beta2.powi(t as i32 + 1));
                self.alpha * m_hat / (v_hat.sqrt() + ADAM_EPS)
            }
            InnerOptim::Amsgrad => {
                let b1t = self.beta1.powi(t as i32 + 1);
                self.m[i] = b1t * self.m[i] + (1.0 - b1t) * g;
                self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
                self.vhat[i] = self.vhat[i].max(self.v[i]);
                self.alpha * self.m[i] / (self.vhat[i].sqrt() + AMSGRAD_EPS)
            }
        }
    }
}

/// A synthesized teaching example with its per-iteration score traces
#[derive(Debug, Clone)]
pub struct Generated {
    /// Synthesized example data (in_dim)
    pub data: Array1<f32>,
    /// Its label (scalar or one-hot, out_dim)
    pub label: Array1<f32>,
    /// Score after each data-synthesis iteration
    pub data_trace: Vec<f32>,
    /// Score after each label-synthesis iteration (empty when the label
    /// phase does not run)
    pub label_trace: Vec<f32>,
}

fn random_label<R: Rng>(out_dim: usize, rng: &mut R) -> Array1<f32> {
    if out_dim == 1 {
        Array1::from_elem(1, rng.random_range(0..2) as f32)
    } else {
        let mut label = Array1::zeros(out_dim);
        label[rng.random_range(0..out_dim)] = 1.0;
        label
    }
}

/// Bit-identical score repetition counter; the loop stalls once the count
/// passes [`STAGNATION_LIMIT`]
fn stalled(trace: &[f32], s: f32, stagnant: &mut u32) -> bool {
    match trace.last() {
        Some(&prev) if prev == s => *stagnant += 1,
        _ => *stagnant = 0,
    }
    *stagnant > STAGNATION_LIMIT
}

/// Synthesize an example from scratch for the current student state
///
/// The candidate starts at the origin with a random label; each iteration
/// ascends the combined difficulty + usefulness objective. Coordinates that
/// step outside the dataset's per-dimension feature range freeze at their
/// out-of-range value. When `optimize_label` is set, a label-synthesis phase
/// follows the data phase.
pub fn generate_example<R: Rng>(
    student: &LinearStudent,
    teacher: &TeacherModel,
    set: &TeachingSet,
    cfg: &TeachingConfig,
    rng: &mut R,
) -> Generated {
    let dim = set.dim();
    let lo = set.feature_min();
    let hi = set.feature_max();

    let mut data: Array1<f32> = Array1::zeros(dim);
    let mut label = random_label(student.out_dim(), rng);

    let score_loss = ScoreLoss::new(student, teacher);
    let mut copt = CoordinateOptimizer::new(dim, cfg.optim, cfg.alpha, cfg.beta1, cfg.beta2);
    let mut data_trace = Vec::with_capacity(cfg.data_steps);
    let mut stagnant = 0u32;

    for t in 0..cfg.data_steps {
        let x = Tensor::new(data.clone(), true);
        let y = Tensor::new(label.clone(), false);
        let mut objective = score_loss.objective(&x, &y, 1);
        backward(&mut objective, None);

        if let Some(g) = x.grad() {
            for i in 0..dim {
                if copt.is_frozen(i) {
                    continue;
                }
                data[i] -= copt.step(i, -g[i], t);
                if data[i] < lo[i] || data[i] > hi[i] {
                    copt.freeze(i);
                }
            }
        }

        let s = score_loss.eval(
            &Tensor::new(data.clone(), false),
            &Tensor::new(label.clone(), false),
            1,
        );
        tracing::trace!(step = t, score = s, "data synthesis");

        // A fully frozen candidate keeps reproducing the same score, so the
        // stagnation counter is the only early exit
        let stop = stalled(&data_trace, s, &mut stagnant);
        data_trace.push(s);
        if stop {
            tracing::debug!(step = t, "data synthesis stalled");
            break;
        }
    }

    let label_trace = if cfg.optimize_label {
        optimize_label(&score_loss, &data, &mut label, cfg)
    } else {
        Vec::new()
    };

    Generated {
        data,
        label,
        data_trace,
        label_trace,
    }
}

/// Synthesize a label for a randomly drawn real example
///
/// The example's data is fixed; only the label moves.
pub fn generate_label<R: Rng>(
    student: &LinearStudent,
    teacher: &TeacherModel,
    set: &TeachingSet,
    cfg: &TeachingConfig,
    rng: &mut R,
) -> Generated {
    let idx = rng.random_range(0..set.len());
    let data = set.row(idx);
    let mut label = random_label(student.out_dim(), rng);

    let score_loss = ScoreLoss::new(student, teacher);
    let label_trace = optimize_label(&score_loss, &data, &mut label, cfg);

    Generated {
        data,
        label,
        data_trace: Vec::new(),
        label_trace,
    }
}

/// Optimize the label of an already chosen example
///
/// Starts from the example's current label rather than a random draw; the
/// data is fixed. Pairs with [`crate::teach::select_example`] to refine the
/// real label of a selected example.
pub fn refine_label(
    student: &LinearStudent,
    teacher: &TeacherModel,
    data: &Array1<f32>,
    label: &Array1<f32>,
    cfg: &TeachingConfig,
) -> Generated {
    assert_eq!(data.len(), student.in_dim(), "example size mismatch");
    assert_eq!(label.len(), student.out_dim(), "label size mismatch");

    let mut label = label.clone();
    let score_loss = ScoreLoss::new(student, teacher);
    let label_trace = optimize_label(&score_loss, data, &mut label, cfg);

    Generated {
        data: data.clone(),
        label,
        data_trace: Vec::new(),
        label_trace,
    }
}

/// The label phase: coordinates clamp to zero and freeze when they go
/// negative, and the whole vector rescales into the L2 cap after every
/// iteration
fn optimize_label(
    score_loss: &ScoreLoss<'_>,
    data: &Array1<f32>,
    label: &mut Array1<f32>,
    cfg: &TeachingConfig,
) -> Vec<f32> {
    let k = label.len();
    let mut copt = CoordinateOptimizer::new(k, cfg.optim, cfg.label_alpha, cfg.beta1, cfg.beta2);
    let mut trace = Vec::with_capacity(cfg.label_steps);
    let mut stagnant = 0u32;

    for t in 0..cfg.label_steps {
        let x = Tensor::new(data.clone(), false);
        let y = Tensor::new(label.clone(), true);
        let mut objective = score_loss.objective(&x, &y, 1);
        backward(&mut objective, None);

        if let Some(g) = y.grad() {
            for i in 0..k {
                if copt.is_frozen(i) {
                    continue;
                }
                label[i] -= copt.step(i, -g[i], t);
                if label[i] < 0.0 {
                    label[i] = 0.0;
                    copt.freeze(i);
                }
            }
        }

        let norm = label.dot(label).sqrt();
        if norm > cfg.label_norm {
            *label *= cfg.label_norm / norm;
        }

        let s = score_loss.eval(
            &Tensor::new(data.clone(), false),
            &Tensor::new(label.clone(), false),
            1,
        );
        tracing::trace!(step = t, score = s, "label synthesis");

        let stop = stalled(&trace, s, &mut stagnant);
        trace.push(s);
        if stop {
            tracing::debug!(step = t, "label synthesis stalled");
            break;
        }
    }

    trace
}
