//! Iterative machine teaching.
//!
//! A *teacher* holding a target hypothesis `w_star` picks (or synthesizes)
//! the training examples that move a *student* model toward that hypothesis
//! fastest. Example quality is measured by two second-order scores:
//!
//! - **difficulty** — `lr² · ‖∂loss/∂W‖²`, how hard the example currently is,
//! - **usefulness** — `2·lr · ⟨W − w_star, ∂loss/∂W⟩`, how much it closes the
//!   gap to the target weights.
//!
//! Selecting minimizes `difficulty − usefulness` over real batches; synthesis
//! runs a per-coordinate Adam/AMSGrad loop on the score's gradient with
//! respect to the example itself, which requires differentiating through the
//! student's weight gradient. The [`autograd`] engine makes that gradient a
//! first-class graph node so the second derivative is an ordinary backward
//! pass.
//!
//! ```no_run
//! use ensenar::config::TeachingConfig;
//! use ensenar::teach::generate_example;
//! use rand::{rngs::StdRng, SeedableRng};
//! # let (teacher, student, set): (ensenar::model::TeacherModel, ensenar::model::LinearStudent, ensenar::data::TeachingSet) = todo!();
//!
//! let cfg = TeachingConfig::default();
//! let mut rng = StdRng::seed_from_u64(42);
//! let generated = generate_example(&student, &teacher, &set, &cfg, &mut rng);
//! ```

pub mod autograd;
pub mod config;
pub mod data;
pub mod model;
pub mod optim;
pub mod teach;

pub use autograd::Tensor;
pub use config::{ConfigError, InnerOptim, ScanOrder, TeachingConfig, UnrolledConfig};
pub use data::{DataError, TeachingSet};
pub use model::{GeneratorNet, LinearStudent, TeacherModel};
pub use teach::{
    difficulty, generate_example, generate_label, refine_label, score, select_example, usefulness,
    Generated, Selection, UnrolledTeacher,
};
