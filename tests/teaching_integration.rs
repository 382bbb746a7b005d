//! End-to-end teaching scenarios on a small synthetic dataset

use ensenar::config::{ScanOrder, TeachingConfig, UnrolledConfig};
use ensenar::data::TeachingSet;
use ensenar::model::{LinearStudent, TeacherModel};
use ensenar::teach::{
    generate_example, refine_label, score, select_example, ExampleDifficulty, ExampleUsefulness,
    UnrolledTeacher,
};
use ensenar::Tensor;
use ndarray::{arr1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 100 points in 2D, linearly separable along the first axis
fn hundred_points() -> TeachingSet {
    let n = 100;
    let mut data = Array2::zeros((n, 2));
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let x0 = i as f32 / 50.0 - 1.0;
        let x1 = ((i * 37) % 100) as f32 / 50.0 - 1.0;
        data[[i, 0]] = x0;
        data[[i, 1]] = x1;
        labels.push(usize::from(x0 > 0.0));
    }
    TeachingSet::new(data, labels, 2).unwrap()
}

fn along_first_axis() -> TeacherModel {
    TeacherModel::new(arr1(&[1.0, 0.0]), 2, 1)
}

#[test]
fn score_decomposes_exactly_over_all_batches() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.3, -0.4]), 2, 1, 0.1);
    let teacher = along_first_axis();

    let dif = ExampleDifficulty::new(&student);
    let usf = ExampleUsefulness::new(&student, &teacher);

    for i in 0..set.nb_batches(10) {
        let x = set.batch_data(i, 10);
        let y = set.batch_targets(i, 10, 1);

        let d = dif.forward(&x, &y, 10).data()[0];
        let u = usf.forward(&x, &y, 10).data()[0];
        assert_eq!(score(&student, &teacher, &x, &y, 10), d - u);
    }
}

#[test]
fn selection_returns_the_argmin_over_ten_batches() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.0, 0.0]), 2, 1, 0.1);
    let teacher = along_first_axis();
    let mut rng = StdRng::seed_from_u64(2);

    let picked = select_example(&student, &teacher, &set, 10, ScanOrder::InOrder, &mut rng);

    let scores: Vec<f32> = (0..10)
        .map(|i| {
            let x = set.batch_data(i, 10);
            let y = set.batch_targets(i, 10, 1);
            score(&student, &teacher, &x, &y, 10)
        })
        .collect();
    let argmin = scores
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap();

    assert_eq!(picked.index, argmin);
    assert_eq!(picked.score, scores[argmin]);
}

#[test]
fn selection_is_reproducible_and_order_independent() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.2, 0.5]), 2, 1, 0.1);
    let teacher = along_first_axis();

    let mut rng = StdRng::seed_from_u64(1);
    let a = select_example(&student, &teacher, &set, 10, ScanOrder::InOrder, &mut rng);
    let b = select_example(&student, &teacher, &set, 10, ScanOrder::InOrder, &mut rng);
    assert_eq!(a.index, b.index);
    assert_eq!(a.score, b.score);

    // Shuffling the visit order cannot change the winning score
    let mut rng = StdRng::seed_from_u64(77);
    let c = select_example(&student, &teacher, &set, 10, ScanOrder::Shuffled, &mut rng);
    assert_eq!(c.score, a.score);
}

#[test]
fn selected_examples_shrink_the_weight_gap() {
    let set = hundred_points();
    let mut student = LinearStudent::from_weights(arr1(&[0.5, 0.5]), 2, 1, 0.05);
    let teacher = along_first_axis();
    let mut rng = StdRng::seed_from_u64(3);

    let initial_gap = teacher.weight_gap(&student);
    for _ in 0..50 {
        let picked = select_example(&student, &teacher, &set, 10, ScanOrder::InOrder, &mut rng);
        student.update(&picked.data.data(), &picked.label.data());
    }

    let final_gap = teacher.weight_gap(&student);
    assert!(
        final_gap < initial_gap,
        "gap {initial_gap} -> {final_gap} did not shrink"
    );
}

#[test]
fn selected_score_predicts_the_gap_change() {
    // For one SGD step, difficulty − usefulness equals the change of
    // ‖W − w_star‖² exactly (up to float rounding)
    let set = hundred_points();
    let mut student = LinearStudent::from_weights(arr1(&[0.4, -0.1]), 2, 1, 0.1);
    let teacher = along_first_axis();
    let mut rng = StdRng::seed_from_u64(4);

    let picked = select_example(&student, &teacher, &set, 10, ScanOrder::InOrder, &mut rng);

    let gap_sq = |s: &LinearStudent| {
        let d = &s.weight_values() - teacher.weight();
        d.dot(&d)
    };
    let before = gap_sq(&student);
    student.update(&picked.data.data(), &picked.label.data());
    let after = gap_sq(&student);

    assert!((after - before - picked.score).abs() < 1e-4);
}

#[test]
fn synthesized_examples_shrink_the_weight_gap() {
    let set = hundred_points();
    let mut student = LinearStudent::from_weights(arr1(&[0.5, 0.5]), 2, 1, 0.05);
    let teacher = along_first_axis();
    let mut cfg = TeachingConfig::default();
    cfg.data_steps = 100;
    let mut rng = StdRng::seed_from_u64(5);

    let initial_gap = teacher.weight_gap(&student);
    for _ in 0..20 {
        let gen = generate_example(&student, &teacher, &set, &cfg, &mut rng);
        student.update(&gen.data, &gen.label);
    }

    let final_gap = teacher.weight_gap(&student);
    assert!(
        final_gap < initial_gap,
        "gap {initial_gap} -> {final_gap} did not shrink"
    );
}

#[test]
fn synthesis_stalls_after_eleven_repeats() {
    // Zero student and zero target: the score gradient vanishes at the
    // origin, so every iteration reproduces the same score bit for bit and
    // the loop must cut off at its twelfth body
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.0, 0.0]), 2, 1, 0.1);
    let teacher = TeacherModel::new(arr1(&[0.0, 0.0]), 2, 1);
    let cfg = TeachingConfig::default();
    let mut rng = StdRng::seed_from_u64(6);

    let gen = generate_example(&student, &teacher, &set, &cfg, &mut rng);

    assert_eq!(gen.data_trace.len(), 12);
    assert!(gen.data_trace.iter().all(|&s| s == gen.data_trace[0]));
    assert_eq!(gen.data.to_vec(), vec![0.0, 0.0]);
}

#[test]
fn synthesized_label_respects_cap_and_sign() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.3, 0.1]), 2, 1, 0.1);
    let teacher = along_first_axis();
    let mut cfg = TeachingConfig::default();
    cfg.optimize_label = true;
    cfg.label_norm = 1.0;
    let mut rng = StdRng::seed_from_u64(8);

    let gen = generate_example(&student, &teacher, &set, &cfg, &mut rng);

    assert!(gen.label.dot(&gen.label).sqrt() <= 1.0 + 1e-6);
    assert!(gen.label.iter().all(|&v| v >= 0.0));
}

#[test]
fn synthesized_data_stays_inside_or_froze_on_the_way_out() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.6, -0.3]), 2, 1, 0.1);
    let teacher = along_first_axis();
    let cfg = TeachingConfig::default();
    let mut rng = StdRng::seed_from_u64(9);

    let gen = generate_example(&student, &teacher, &set, &cfg, &mut rng);
    let lo = set.feature_min();
    let hi = set.feature_max();

    // A coordinate may sit outside the box only by its final, frozen step
    for (i, &v) in gen.data.iter().enumerate() {
        assert!(v.is_finite());
        let span = hi[i] - lo[i];
        assert!(v >= lo[i] - span && v <= hi[i] + span);
    }
}

#[test]
fn multiclass_selection_and_synthesis() {
    // Two-output student with one-hot simplex labels through the whole
    // pipeline
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.4, 0.1, -0.2, 0.3]), 2, 2, 0.1);
    let teacher = TeacherModel::new(arr1(&[1.0, 0.0, 0.0, 1.0]), 2, 2);
    let mut rng = StdRng::seed_from_u64(31);

    let picked = select_example(&student, &teacher, &set, 10, ScanOrder::InOrder, &mut rng);
    assert!(picked.score.is_finite());
    assert_eq!(picked.label.len(), 20);
    let targets = picked.label.data();
    for row in 0..10 {
        let row_sum: f32 = targets[row * 2] + targets[row * 2 + 1];
        assert_eq!(row_sum, 1.0);
    }

    // Every batch scores at least as high as the winner in the 2-output case
    for i in 0..set.nb_batches(10) {
        let x = set.batch_data(i, 10);
        let y = set.batch_targets(i, 10, 2);
        assert!(score(&student, &teacher, &x, &y, 10) >= picked.score);
    }

    let mut cfg = TeachingConfig::default();
    cfg.optimize_label = true;
    cfg.label_norm = 1.0;
    let gen = generate_example(&student, &teacher, &set, &cfg, &mut rng);

    assert_eq!(gen.data.len(), 2);
    assert_eq!(gen.label.len(), 2);
    assert!(!gen.data_trace.is_empty());
    assert!(!gen.label_trace.is_empty());
    assert!(gen.label.iter().all(|&v| v >= 0.0));
    assert!(gen.label.dot(&gen.label).sqrt() <= 1.0 + 1e-6);
}

#[test]
fn selected_example_label_can_be_refined() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.3, -0.2]), 2, 1, 0.1);
    let teacher = along_first_axis();
    let cfg = TeachingConfig::default();
    let mut rng = StdRng::seed_from_u64(33);

    let picked = select_example(&student, &teacher, &set, 1, ScanOrder::InOrder, &mut rng);
    let refined = refine_label(
        &student,
        &teacher,
        &picked.data.data(),
        &picked.label.data(),
        &cfg,
    );

    // The selected example's data is untouched; only the label moved
    assert_eq!(refined.data, picked.data.data());
    assert!(refined.data_trace.is_empty());
    assert!(!refined.label_trace.is_empty());
    assert!(refined.label.iter().all(|&v| v >= 0.0));
    assert!(refined.label.dot(&refined.label).sqrt() <= cfg.label_norm + 1e-6);
}

#[test]
fn unrolled_generator_trains_and_teaches() {
    let set = hundred_points();
    let student = LinearStudent::from_weights(arr1(&[0.5, 0.5]), 2, 1, 0.05);
    let teacher = along_first_axis();
    let mut cfg = UnrolledConfig::default();
    cfg.hidden = 32;
    cfg.lr = 1e-3;
    let mut rng = StdRng::seed_from_u64(10);

    let mut unrolled = UnrolledTeacher::new(&student, &set, &cfg, &mut rng);
    for _ in 0..100 {
        let loss = unrolled.fit_step(&student, &teacher, &set, &mut rng);
        assert!(loss.is_finite());
    }

    let mut pupil = LinearStudent::from_weights(arr1(&[0.5, 0.5]), 2, 1, 0.05);
    let lo = set.feature_min();
    let hi = set.feature_max();
    for _ in 0..10 {
        let (synth, _) = unrolled.teach_step(&mut pupil, &set, &mut rng);
        for (i, &v) in synth.iter().enumerate() {
            assert!(v >= lo[i] && v <= hi[i]);
        }
    }
    assert!(pupil.weight_values().iter().all(|v| v.is_finite()));
}

#[test]
fn usefulness_is_differentiable_in_the_example() {
    // The second-order path: backpropagating the usefulness score reaches
    // the example's data leaf
    let student = LinearStudent::from_weights(arr1(&[0.3, -0.2]), 2, 1, 0.1);
    let teacher = along_first_axis();

    let x = Tensor::from_vec(vec![0.5, 0.5], true);
    let y = Tensor::from_vec(vec![1.0], false);

    let usf = ExampleUsefulness::new(&student, &teacher);
    let mut u = usf.forward(&x, &y, 1);
    ensenar::autograd::backward(&mut u, None);

    let grad = x.grad().expect("example gradient populated");
    assert!(grad.iter().any(|&g| g != 0.0));
}
