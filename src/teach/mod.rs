//! Core teaching algorithms
//!
//! - [`score`]: difficulty/usefulness scoring of candidate examples
//!   (second-order: differentiable through the student's weight gradient)
//! - [`select`]: linear scan of real batches for the best teaching example
//! - [`generate`]: bilevel inner loop synthesizing an example and/or label
//!   by per-coordinate Adam/AMSGrad on the score gradient
//! - [`unrolled`]: trains a generator network by differentiating through a
//!   one-step student update

pub mod generate;
pub mod score;
pub mod select;
pub mod unrolled;

pub use generate::{generate_example, generate_label, refine_label, Generated};
pub use score::{difficulty, score, usefulness, ExampleDifficulty, ExampleUsefulness, ScoreLoss};
pub use select::{select_example, Selection};
pub use unrolled::UnrolledTeacher;
