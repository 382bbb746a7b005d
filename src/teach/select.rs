//! Selection of real teaching examples

use crate::autograd::Tensor;
use crate::config::ScanOrder;
use crate::data::TeachingSet;
use crate::model::{LinearStudent, TeacherModel};
use crate::teach::score::ScoreLoss;
use rand::seq::SliceRandom;
use rand::Rng;

/// The batch a scan picked as the best next teaching example
#[derive(Debug)]
pub struct Selection {
    /// Flat batch×in_dim example data
    pub data: Tensor,
    /// Matching targets (scalar or one-hot per row)
    pub label: Tensor,
    /// Index of the winning batch
    pub index: usize,
    /// Its score
    pub score: f32,
}

/// Scan the dataset's batches and return the one with the lowest score
///
/// Ties keep the earliest batch in visit order, so for a fixed student,
/// teacher, and dataset the in-order scan is fully deterministic. Trailing
/// rows that do not fill a batch are never scored. The shuffled order
/// permutes only which batch wins a tie; scores are unaffected.
///
/// # Panics
/// Panics if the dataset holds fewer rows than one batch.
pub fn select_example<R: Rng>(
    student: &LinearStudent,
    teacher: &TeacherModel,
    set: &TeachingSet,
    batch_size: usize,
    order: ScanOrder,
    rng: &mut R,
) -> Selection {
    let nb_batch = set.nb_batches(batch_size);
    assert!(nb_batch > 0, "batch size exceeds dataset size");

    let mut visit: Vec<usize> = (0..nb_batch).collect();
    if order == ScanOrder::Shuffled {
        visit.shuffle(rng);
    }

    let score_loss = ScoreLoss::new(student, teacher);
    let out_dim = student.out_dim();

    let mut best_index = visit[0];
    let mut best_score = f32::INFINITY;
    for &i in &visit {
        let data = set.batch_data(i, batch_size);
        let label = set.batch_targets(i, batch_size, out_dim);
        let s = score_loss.eval(&data, &label, batch_size);
        if s < best_score {
            best_score = s;
            best_index = i;
        }
    }

    tracing::debug!(index = best_index, score = best_score, "selected batch");

    Selection {
        data: set.batch_data(best_index, batch_size),
        label: set.batch_targets(best_index, batch_size, out_dim),
        index: best_index,
        score: best_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teach::score;
    use ndarray::{arr1, array};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixture() -> (LinearStudent, TeacherModel, TeachingSet) {
        let student = LinearStudent::from_weights(arr1(&[0.2, -0.3]), 2, 1, 0.1);
        let teacher = TeacherModel::new(arr1(&[1.0, 0.0]), 2, 1);
        let data = array![[1.0, 0.0], [0.0, 1.0], [2.0, 2.0], [-1.0, 0.5], [0.3, 0.3]];
        let set = TeachingSet::new(data, vec![1, 0, 1, 0, 0], 2).unwrap();
        (student, teacher, set)
    }

    #[test]
    fn test_selects_minimum_score_batch() {
        let (student, teacher, set) = fixture();
        let mut rng = StdRng::seed_from_u64(0);

        let picked = select_example(&student, &teacher, &set, 1, ScanOrder::InOrder, &mut rng);

        // Every batch scores at least as high as the winner
        for i in 0..set.nb_batches(1) {
            let x = set.batch_data(i, 1);
            let y = set.batch_targets(i, 1, 1);
            assert!(score(&student, &teacher, &x, &y, 1) >= picked.score);
        }
        assert_eq!(
            picked.score,
            score(&student, &teacher, &picked.data, &picked.label, 1)
        );
    }

    #[test]
    fn test_in_order_scan_is_deterministic() {
        let (student, teacher, set) = fixture();
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(99);

        let a = select_example(&student, &teacher, &set, 1, ScanOrder::InOrder, &mut rng_a);
        let b = select_example(&student, &teacher, &set, 1, ScanOrder::InOrder, &mut rng_b);

        assert_eq!(a.index, b.index);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_partial_trailing_batch_is_ignored() {
        let (student, teacher, set) = fixture();
        let mut rng = StdRng::seed_from_u64(2);

        // 5 rows, batch size 2: only batches 0 and 1 are eligible
        let picked = select_example(&student, &teacher, &set, 2, ScanOrder::InOrder, &mut rng);
        assert!(picked.index < 2);
        assert_eq!(picked.data.len(), 4);
    }

    #[test]
    #[should_panic(expected = "batch size exceeds dataset size")]
    fn test_oversized_batch_panics() {
        let (student, teacher, set) = fixture();
        let mut rng = StdRng::seed_from_u64(3);
        select_example(&student, &teacher, &set, 6, ScanOrder::InOrder, &mut rng);
    }
}
