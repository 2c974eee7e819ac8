#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the phynet crates: datasets of spin-chain instances, the error surface and the pluggable learner contracts."]

pub mod errors;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, PhyError};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{checked_state_dimension, state_dimension, Dataset, FieldRecord, Instance};

/// Evaluation contract for a single learner of an ensemble.
///
/// A learner maps a flattened [`FieldRecord`] to a predicted state vector and
/// exposes its parameters as one flat slice so optimizers stay
/// architecture-agnostic.
pub trait Network: Send + Sync {
    /// Length of the expected input vector.
    fn input_len(&self) -> usize;

    /// Length of the produced state vector.
    fn output_len(&self) -> usize;

    /// Evaluates the learner on one input.
    fn forward(&self, input: &[f64]) -> Vec<f64>;

    /// Back-propagates `output_grad` (dL/d output) at `input` and returns
    /// dL/d parameters, laid out like [`Network::parameters`].
    fn backward(&self, input: &[f64], output_grad: &[f64]) -> Vec<f64>;

    /// Flat view of the learner parameters.
    fn parameters(&self) -> &[f64];

    /// Mutable flat view of the learner parameters.
    fn parameters_mut(&mut self) -> &mut [f64];

    /// Re-draws every parameter from `rng`, discarding all previous state.
    fn initialize(&mut self, rng: &mut RngHandle);

    /// Overwrites the parameters with `params`.
    fn set_parameters(&mut self, params: &[f64]) -> Result<(), PhyError> {
        let current = self.parameters_mut();
        if current.len() != params.len() {
            return Err(PhyError::shape(
                "parameter-count",
                "parameter snapshot does not match network",
                current.len(),
                params.len(),
            ));
        }
        current.copy_from_slice(params);
        Ok(())
    }
}

/// Scalar cost functional comparing a predicted and a reference state.
pub trait Loss: Send + Sync {
    /// Returns the cost for one prediction.
    fn evaluate(&self, predicted: &[f64], target: &[f64]) -> f64;

    /// Returns dL/d predicted.
    fn gradient(&self, predicted: &[f64], target: &[f64]) -> Vec<f64>;
}

/// Parameter update rule. Each learner owns an independent clone.
pub trait Optimizer: Clone + Send + Sync {
    /// Applies one update to `params` given the gradient `grads`.
    fn step(&mut self, params: &mut [f64], grads: &[f64]);

    /// Clears any accumulated state (moments, step counters).
    fn reset(&mut self);
}
