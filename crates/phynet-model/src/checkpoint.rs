use std::fs;
use std::path::Path;

use phynet_core::{ErrorInfo, Loss, Network, Optimizer, PhyError};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::model::Model;

/// Serialized ensemble parameters together with the run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleCheckpoint {
    /// Register size the learners were trained for.
    pub num_qubits: usize,
    /// Configuration snapshot of the model.
    pub config: ModelConfig,
    /// Flat parameter vector of every learner, in ensemble order.
    pub learners: Vec<Vec<f64>>,
}

impl EnsembleCheckpoint {
    /// Restores the payload from disk.
    pub fn load(path: &Path) -> Result<Self, PhyError> {
        let contents =
            fs::read_to_string(path).map_err(|err| PhyError::io("checkpoint-read", path, err))?;
        serde_json::from_str(&contents).map_err(|err| {
            PhyError::Serde(
                ErrorInfo::new("checkpoint-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Writes the payload to disk as pretty JSON.
    pub fn store(&self, path: &Path) -> Result<(), PhyError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| PhyError::io("checkpoint-mkdir", parent, err))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            PhyError::Serde(
                ErrorInfo::new("checkpoint-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| PhyError::io("checkpoint-write", path, err))
    }
}

impl<N, L, O> Model<N, L, O>
where
    N: Network,
    L: Loss,
    O: Optimizer,
{
    /// Captures the current learner parameters.
    pub fn checkpoint(&self) -> EnsembleCheckpoint {
        EnsembleCheckpoint {
            num_qubits: self.num_qubits,
            config: self.config.clone(),
            learners: self
                .networks
                .iter()
                .map(|network| network.parameters().to_vec())
                .collect(),
        }
    }

    /// Writes the learner parameters to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PhyError> {
        self.checkpoint().store(path)?;
        tracing::info!(path = %path.display(), learners = self.networks.len(), "checkpoint written");
        Ok(())
    }

    /// Overwrites the learner parameters from a checkpoint. Optimizer state
    /// is reset because it is not persisted.
    ///
    /// Every learner is checked before any is written, so a rejected
    /// checkpoint leaves the ensemble untouched.
    pub fn restore(&mut self, checkpoint: &EnsembleCheckpoint) -> Result<(), PhyError> {
        if checkpoint.num_qubits != self.num_qubits {
            return Err(PhyError::shape(
                "checkpoint-register",
                "checkpoint register size differs from the ensemble",
                self.num_qubits,
                checkpoint.num_qubits,
            ));
        }
        if checkpoint.learners.len() != self.networks.len() {
            return Err(PhyError::shape(
                "checkpoint-ensemble",
                "checkpoint holds a different number of learners",
                self.networks.len(),
                checkpoint.learners.len(),
            ));
        }
        let pairs = self.networks.iter().zip(&checkpoint.learners);
        for (idx, (network, params)) in pairs.enumerate() {
            let expected = network.parameters().len();
            if params.len() != expected {
                return Err(PhyError::Shape(
                    ErrorInfo::new("parameter-count", "checkpoint learner has the wrong size")
                        .with_context("learner", idx.to_string())
                        .with_context("expected", expected.to_string())
                        .with_context("found", params.len().to_string()),
                ));
            }
        }
        if checkpoint.config != self.config {
            tracing::warn!(
                checkpoint = ?checkpoint.config,
                model = ?self.config,
                "checkpoint config differs from the model config"
            );
        }
        for (network, params) in self.networks.iter_mut().zip(&checkpoint.learners) {
            network.set_parameters(params)?;
        }
        for optimizer in &mut self.optimizers {
            *optimizer = self.prototype.clone();
            optimizer.reset();
        }
        Ok(())
    }

    /// Reads `path` and restores the learner parameters from it.
    pub fn load_parameters(&mut self, path: &Path) -> Result<(), PhyError> {
        let checkpoint = EnsembleCheckpoint::load(path)?;
        self.restore(&checkpoint)
    }
}
