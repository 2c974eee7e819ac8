use std::fs;
use std::path::Path;

use phynet_core::{ErrorInfo, PhyError};
use phynet_dump::Precision;
use phynet_gendat::MAX_QUBITS;
use phynet_model::ModelConfig;
use phynet_nn::{LossSpec, MlpConfig, OptimizerSpec};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

fn default_trials() -> usize {
    1
}

fn default_epochs() -> usize {
    100
}

fn default_ensemble_size() -> usize {
    4
}

fn default_report_every() -> usize {
    1
}

/// File names, relative to the run directory, of every artefact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputFiles {
    pub metrics: String,
    pub overlap: String,
    pub entropy: String,
    pub magnetization: String,
    pub lyapunov: String,
    pub radviz: String,
    pub wandb: String,
    pub checkpoint: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            metrics: "metrics.csv".into(),
            overlap: "overlap.csv".into(),
            entropy: "entropy.csv".into(),
            magnetization: "magnetization.csv".into(),
            lyapunov: "lyapunov.csv".into(),
            radviz: "radviz.csv".into(),
            wandb: "wandb_radviz.csv".into(),
            checkpoint: "ensemble.json".into(),
        }
    }
}

/// Training run description loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub num_qubits: usize,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_ensemble_size")]
    pub ensemble_size: usize,
    /// Metrics are appended every `report_every` epochs and after the last one.
    #[serde(default = "default_report_every")]
    pub report_every: usize,
    #[serde(default)]
    pub network: MlpConfig,
    #[serde(default)]
    pub optimizer: OptimizerSpec,
    #[serde(default)]
    pub loss: LossSpec,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub outputs: OutputFiles,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, PhyError> {
        let text = fs::read_to_string(path).map_err(|err| PhyError::io("run-config-read", path, err))?;
        let config: Self = serde_yaml::from_str(&text).map_err(|err| {
            PhyError::Config(
                ErrorInfo::new("run-config-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PhyError> {
        if self.num_qubits == 0 || self.num_qubits > MAX_QUBITS {
            return Err(PhyError::Config(
                ErrorInfo::new("run-num-qubits", "num_qubits outside supported range")
                    .with_context("num_qubits", self.num_qubits.to_string())
                    .with_hint(format!("use 1..={MAX_QUBITS}")),
            ));
        }
        if self.ensemble_size == 0 {
            return Err(PhyError::Config(ErrorInfo::new(
                "run-ensemble-size",
                "ensemble_size must be at least 1",
            )));
        }
        if self.report_every == 0 {
            return Err(PhyError::Config(ErrorInfo::new(
                "run-report-every",
                "report_every must be at least 1",
            )));
        }
        self.model.validate()
    }

    /// SHA-256 of the canonical JSON form, hex encoded.
    pub fn hash(&self) -> Result<String, PhyError> {
        let bytes = serde_json::to_vec(self)
            .map_err(|err| PhyError::Serde(ErrorInfo::new("run-config-hash", err.to_string())))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
