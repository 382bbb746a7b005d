//! Property-based gradient checks over random inputs

use super::test_utils::{analytic_grad, assert_grads_close, finite_difference};
use crate::autograd::{linear, mse_weight_grad, norm_sq, relu, sum, tanh, Tensor};
use ndarray::Array1;
use proptest::prelude::*;

fn small_vec(len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-2.0f32..2.0, len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_norm_sq_gradient(vals in small_vec(4)) {
        let x = Array1::from(vals);
        let analytic = analytic_grad(norm_sq, &x);
        let numeric = finite_difference(|v| v.dot(v), &x, 1e-2);
        assert_grads_close(&analytic, &numeric, 2e-2);
    }

    #[test]
    fn prop_tanh_gradient(vals in small_vec(4)) {
        let x = Array1::from(vals);
        let analytic = analytic_grad(|t| sum(&tanh(t)), &x);
        let numeric = finite_difference(|v| v.iter().map(|&e| e.tanh()).sum(), &x, 1e-2);
        assert_grads_close(&analytic, &numeric, 2e-2);
    }

    #[test]
    fn prop_relu_gradient_away_from_kink(vals in prop::collection::vec(0.1f32..2.0, 4)) {
        // Positive inputs only, where relu is differentiable
        let x = Array1::from(vals);
        let analytic = analytic_grad(|t| sum(&relu(t)), &x);
        let numeric = finite_difference(|v| v.iter().map(|&e| e.max(0.0)).sum(), &x, 1e-3);
        assert_grads_close(&analytic, &numeric, 1e-2);
    }

    #[test]
    fn prop_linear_weight_gradient(
        x_vals in small_vec(6),
        w_vals in small_vec(3),
    ) {
        let x_arr = Array1::from(x_vals);
        let w_arr = Array1::from(w_vals);
        let x = Tensor::new(x_arr.clone(), false);

        let analytic = analytic_grad(|w| norm_sq(&linear(&x, w, 2, 3, 1)), &w_arr);
        let numeric = finite_difference(
            |w| {
                let mut total = 0.0f32;
                for row in 0..2 {
                    let y: f32 = (0..3).map(|j| x_arr[row * 3 + j] * w[j]).sum();
                    total += y * y;
                }
                total
            },
            &w_arr,
            1e-2,
        );
        assert_grads_close(&analytic, &numeric, 5e-2);
    }

    #[test]
    fn prop_mse_weight_grad_second_order(
        x_vals in small_vec(4),
        w_vals in small_vec(2),
        y_vals in small_vec(2),
    ) {
        let x_arr = Array1::from(x_vals);
        let w = Tensor::new(Array1::from(w_vals.clone()), false);
        let y = Tensor::new(Array1::from(y_vals.clone()), false);

        let manual = |x: &Array1<f32>| {
            let mut g = [0.0f32; 2];
            for row in 0..2 {
                let pred = w_vals[0] * x[row * 2] + w_vals[1] * x[row * 2 + 1];
                let r = pred - y_vals[row];
                g[0] += r * x[row * 2];
                g[1] += r * x[row * 2 + 1];
            }
            let c = 2.0 / 2.0;
            (c * g[0]) * (c * g[0]) + (c * g[1]) * (c * g[1])
        };

        let analytic = analytic_grad(
            |x| norm_sq(&mse_weight_grad(x, &w, &y, 2, 2, 1)),
            &x_arr,
        );
        let numeric = finite_difference(manual, &x_arr, 1e-2);
        assert_grads_close(&analytic, &numeric, 5e-2);
    }
}
