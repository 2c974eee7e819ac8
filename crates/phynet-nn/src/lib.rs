//! Reference implementations of the learner contracts from `phynet-core`.

pub mod loss;
pub mod mlp;
pub mod optim;

pub use loss::{Infidelity, LossSpec, MeanSquared, StateLoss};
pub use mlp::{Activation, Mlp, MlpConfig};
pub use optim::{Adam, AnyOptimizer, OptimizerSpec, Sgd};
