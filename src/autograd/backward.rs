//! Backward operation trait

/// A recorded operation that can propagate gradients to its inputs.
///
/// Implementations read the accumulated gradient of their output tensor,
/// accumulate the corresponding gradients into each input that requires
/// them, and recurse into the inputs' own backward ops.
pub trait BackwardOp {
    /// Propagate gradients from the output to the inputs
    fn backward(&self);
}
