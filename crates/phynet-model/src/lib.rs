//! Ensemble training and physics metrics for neural surrogates of spin-chain
//! eigenstates.
//!
//! [`Model`] owns a fixed ensemble of [`phynet_core::Network`] learners, one
//! [`phynet_core::Loss`] and an optimizer clone per learner. Besides training
//! it evaluates state fidelity, entanglement entropy across a configured
//! bipartition, magnetization and a finite-perturbation sensitivity
//! estimate, and persists them as append-only CSV tables.

pub mod checkpoint;
pub mod config;
pub mod metrics;
pub mod model;
pub mod physics;
pub mod radviz;
pub mod report;

pub use checkpoint::EnsembleCheckpoint;
pub use config::{Aggregation, Bipartition, LyapunovConfig, ModelConfig, PerturbationNorm};
pub use model::{Model, PassStats};
pub use physics::{EntropySummary, InstanceScore, MagnetizationRow};
pub use radviz::{bucket, radviz, PARAMETER_ANCHORS};
pub use report::{MetricBundle, MetricRecord, METRICS_HEADER};
