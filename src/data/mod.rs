//! Dataset collaborator for teaching loops
//!
//! A [`TeachingSet`] hands out fixed-order batch slices and the per-dimension
//! min/max statistics the synthetic-example generator derives its box bounds
//! from. The selector scans batches in storage order; reordering, when
//! wanted, is the caller's job via [`TeachingSet::shuffle`] before scanning.

use crate::Tensor;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

/// Dataset construction errors
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Dataset is empty")]
    Empty,

    #[error("Number of labels ({labels}) does not match number of rows ({rows})")]
    LabelCountMismatch { labels: usize, rows: usize },

    #[error("Label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("Invalid class count: {0} (must be > 0)")]
    InvalidClassCount(usize),
}

/// A labeled dataset with fixed iteration order
#[derive(Debug, Clone)]
pub struct TeachingSet {
    data: Array2<f32>,
    labels: Vec<usize>,
    n_classes: usize,
}

impl TeachingSet {
    /// Create a dataset from a row-per-example matrix and class labels
    pub fn new(data: Array2<f32>, labels: Vec<usize>, n_classes: usize) -> Result<Self, DataError> {
        if n_classes == 0 {
            return Err(DataError::InvalidClassCount(n_classes));
        }
        if data.nrows() == 0 {
            return Err(DataError::Empty);
        }
        if labels.len() != data.nrows() {
            return Err(DataError::LabelCountMismatch {
                labels: labels.len(),
                rows: data.nrows(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(DataError::LabelOutOfRange { label, n_classes });
        }

        Ok(Self {
            data,
            labels,
            n_classes,
        })
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Feature dimension
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    /// Number of classes
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of full batches of `batch_size`; remainder examples are dropped
    pub fn nb_batches(&self, batch_size: usize) -> usize {
        self.len() / batch_size
    }

    /// The `i`-th contiguous batch as a flat leaf tensor (batch×dim)
    ///
    /// # Panics
    /// Panics if the batch is out of range; callers iterate over
    /// [`Self::nb_batches`].
    pub fn batch_data(&self, i: usize, batch_size: usize) -> Tensor {
        let start = i * batch_size;
        let end = start + batch_size;
        assert!(end <= self.len(), "batch {i} out of range");

        let rows = self.data.slice(ndarray::s![start..end, ..]);
        Tensor::new(
            Array1::from_iter(rows.iter().copied()),
            false,
        )
    }

    /// Targets for the `i`-th batch, shaped for a student with `out_dim`
    /// outputs: scalar class labels when `out_dim == 1`, one-hot rows when
    /// `out_dim == n_classes`
    pub fn batch_targets(&self, i: usize, batch_size: usize, out_dim: usize) -> Tensor {
        let start = i * batch_size;
        let end = start + batch_size;
        assert!(end <= self.len(), "batch {i} out of range");

        if out_dim == 1 {
            Tensor::new(
                Array1::from_iter(self.labels[start..end].iter().map(|&l| l as f32)),
                false,
            )
        } else {
            assert_eq!(
                out_dim, self.n_classes,
                "student output dimension must match class count"
            );
            let mut targets = Array1::zeros(batch_size * out_dim);
            for (row, &label) in self.labels[start..end].iter().enumerate() {
                targets[row * out_dim + label] = 1.0;
            }
            Tensor::new(targets, false)
        }
    }

    /// A single example's features
    pub fn row(&self, idx: usize) -> Array1<f32> {
        self.data.row(idx).to_owned()
    }

    /// A single example's class label
    pub fn label(&self, idx: usize) -> usize {
        self.labels[idx]
    }

    /// One-hot encoding of a class label sized for `out_dim` outputs
    pub fn one_hot(&self, label: usize, out_dim: usize) -> Array1<f32> {
        if out_dim == 1 {
            Array1::from(vec![label as f32])
        } else {
            let mut v = Array1::zeros(out_dim);
            v[label] = 1.0;
            v
        }
    }

    /// Per-dimension minimum over all examples
    pub fn feature_min(&self) -> Array1<f32> {
        self.data
            .fold_axis(Axis(0), f32::INFINITY, |&acc, &v| acc.min(v))
    }

    /// Per-dimension maximum over all examples
    pub fn feature_max(&self) -> Array1<f32> {
        self.data
            .fold_axis(Axis(0), f32::NEG_INFINITY, |&acc, &v| acc.max(v))
    }

    /// Shuffle examples in place (caller-side pre-scan reordering)
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        let mut data = Array2::zeros((self.len(), self.dim()));
        let mut labels = Vec::with_capacity(self.len());
        for (dst, &src) in order.iter().enumerate() {
            data.row_mut(dst).assign(&self.data.row(src));
            labels.push(self.labels[src]);
        }

        self.data = data;
        self.labels = labels;
    }
}
