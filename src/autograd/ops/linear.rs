//! Linear-model autograd operations
//!
//! [`linear`] is the batched forward pass `X·Wᵀ` of a linear layer.
//! [`mse_weight_grad`] materializes the MSE *weight gradient* of that layer
//! as a graph node: scores defined on the gradient (difficulty, usefulness)
//! become ordinary graph expressions, and differentiating them with respect
//! to the input or target is a plain first-order backward pass instead of a
//! retained second tape.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// C = A·B with A (m×k) and B (k×n), both row-major
fn mm(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    c
}

/// C = Aᵀ·B with A stored (k×m) and B stored (k×n); result is m×n
fn mm_t_left(a: &[f32], b: &[f32], k: usize, m: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for p in 0..k {
        for i in 0..m {
            let a_pi = a[p * m + i];
            if a_pi == 0.0 {
                continue;
            }
            for j in 0..n {
                c[i * n + j] += a_pi * b[p * n + j];
            }
        }
    }
    c
}

/// C = A·Bᵀ with A (m×k) and B stored (n×k); result is m×n
fn mm_t_right(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut s = 0.0;
            for p in 0..k {
                s += a[i * k + p] * b[j * k + p];
            }
            c[i * n + j] = s;
        }
    }
    c
}

/// Batched linear forward pass
///
/// Computes `P = X·Wᵀ` where:
/// - X is batch×in_dim (flattened to length batch*in_dim)
/// - W is out_dim×in_dim (flattened to length out_dim*in_dim)
/// - P is batch×out_dim (flattened to length batch*out_dim)
pub fn linear(x: &Tensor, w: &Tensor, batch: usize, in_dim: usize, out_dim: usize) -> Tensor {
    assert_eq!(x.len(), batch * in_dim, "input size mismatch");
    assert_eq!(w.len(), out_dim * in_dim, "weight size mismatch");

    let x_data = x.data();
    let w_data = w.data();
    let p = mm_t_right(
        x_data.as_slice().expect("input must be contiguous"),
        w_data.as_slice().expect("weight must be contiguous"),
        batch,
        in_dim,
        out_dim,
    );

    let requires_grad = x.requires_grad() || w.requires_grad();
    let mut result = Tensor::new(Array1::from(p), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            x: x.clone(),
            w: w.clone(),
            batch,
            in_dim,
            out_dim,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct LinearBackward {
    x: Tensor,
    w: Tensor,
    batch: usize,
    in_dim: usize,
    out_dim: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for LinearBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let gbar = grad.as_slice().expect("gradient must be contiguous");

            if self.x.requires_grad() {
                // ∂L/∂X = Ḡ·W
                let w_data = self.w.data();
                let grad_x = mm(
                    gbar,
                    w_data.as_slice().expect("weight must be contiguous"),
                    self.batch,
                    self.out_dim,
                    self.in_dim,
                );
                self.x.accumulate_grad(Array1::from(grad_x));
            }
            if self.w.requires_grad() {
                // ∂L/∂W = Ḡᵀ·X
                let x_data = self.x.data();
                let grad_w = mm_t_left(
                    gbar,
                    x_data.as_slice().expect("input must be contiguous"),
                    self.batch,
                    self.out_dim,
                    self.in_dim,
                );
                self.w.accumulate_grad(Array1::from(grad_w));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.w.backward_op() {
                op.backward();
            }
        }
    }
}

/// Weight gradient of the batched MSE loss, as a graph node
///
/// For the linear model `P = X·Wᵀ` under `L = mean((P − Y)²)` this computes
///
/// ```text
/// G = ∂L/∂W = c·(X·Wᵀ − Y)ᵀ·X,   c = 2 / (batch·out_dim)
/// ```
///
/// with analytic backward into x, w, and y. `G` is out_dim×in_dim, the same
/// shape as the weight. The residual D = X·Wᵀ − Y appears twice in the
/// gradient formulas, which is why this is one fused op rather than a
/// composition of the generic ops.
pub fn mse_weight_grad(
    x: &Tensor,
    w: &Tensor,
    y: &Tensor,
    batch: usize,
    in_dim: usize,
    out_dim: usize,
) -> Tensor {
    assert_eq!(x.len(), batch * in_dim, "input size mismatch");
    assert_eq!(w.len(), out_dim * in_dim, "weight size mismatch");
    assert_eq!(y.len(), batch * out_dim, "target size mismatch");

    let c = 2.0 / (batch * out_dim) as f32;

    let x_data = x.data();
    let w_data = w.data();
    let y_data = y.data();
    let xs = x_data.as_slice().expect("input must be contiguous");
    let ws = w_data.as_slice().expect("weight must be contiguous");
    let ys = y_data.as_slice().expect("target must be contiguous");

    // D = X·Wᵀ − Y (batch×out), G = c·Dᵀ·X (out×in)
    let mut d = mm_t_right(xs, ws, batch, in_dim, out_dim);
    for (d_i, y_i) in d.iter_mut().zip(ys.iter()) {
        *d_i -= y_i;
    }
    let mut g = mm_t_left(&d, xs, batch, out_dim, in_dim);
    for g_i in g.iter_mut() {
        *g_i *= c;
    }

    let requires_grad = x.requires_grad() || w.requires_grad() || y.requires_grad();
    let mut result = Tensor::new(Array1::from(g), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MseWeightGradBackward {
            x: x.clone(),
            w: w.clone(),
            y: y.clone(),
            batch,
            in_dim,
            out_dim,
            c,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MseWeightGradBackward {
    x: Tensor,
    w: Tensor,
    y: Tensor,
    batch: usize,
    in_dim: usize,
    out_dim: usize,
    c: f32,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MseWeightGradBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let gbar = grad.as_slice().expect("gradient must be contiguous");
            let (b, i, o) = (self.batch, self.in_dim, self.out_dim);

            let x_data = self.x.data();
            let w_data = self.w.data();
            let y_data = self.y.data();
            let xs = x_data.as_slice().expect("input must be contiguous");
            let ws = w_data.as_slice().expect("weight must be contiguous");
            let ys = y_data.as_slice().expect("target must be contiguous");

            // Recompute the residual D = X·Wᵀ − Y
            let mut d = mm_t_right(xs, ws, b, i, o);
            for (d_i, y_i) in d.iter_mut().zip(ys.iter()) {
                *d_i -= y_i;
            }

            // X·Ḡᵀ (batch×out), shared by the x and y gradients
            let x_gbar_t = mm_t_right(xs, gbar, b, i, o);

            if self.x.requires_grad() {
                // ∂L/∂X = c·(D·Ḡ + (X·Ḡᵀ)·W)
                let term1 = mm(&d, gbar, b, o, i);
                let term2 = mm(&x_gbar_t, ws, b, o, i);
                let grad_x =
                    Array1::from_iter(term1.iter().zip(term2.iter()).map(|(&t1, &t2)| {
                        self.c * (t1 + t2)
                    }));
                self.x.accumulate_grad(grad_x);
            }
            if self.y.requires_grad() {
                // ∂L/∂Y = −c·X·Ḡᵀ
                let grad_y = Array1::from_iter(x_gbar_t.iter().map(|&v| -self.c * v));
                self.y.accumulate_grad(grad_y);
            }
            if self.w.requires_grad() {
                // ∂L/∂W = c·Ḡ·(XᵀX)
                let xtx = mm_t_left(xs, xs, b, i, i);
                let grad_w = mm(gbar, &xtx, o, i, i);
                self.w
                    .accumulate_grad(Array1::from_iter(grad_w.iter().map(|&v| self.c * v)));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.w.backward_op() {
                op.backward();
            }
            if let Some(op) = self.y.backward_op() {
                op.backward();
            }
        }
    }
}
