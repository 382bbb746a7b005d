//! Student, teacher, and generator models

mod generator;
mod linear;
mod teacher;

pub use generator::GeneratorNet;
pub use linear::LinearStudent;
pub use teacher::TeacherModel;
