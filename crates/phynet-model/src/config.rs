use phynet_core::{ErrorInfo, PhyError};
use serde::{Deserialize, Serialize};

/// How per-learner results are combined into one ensemble figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Evaluate the metric for every learner, then average the metric values.
    #[default]
    MeanOfMetrics,
    /// Average the sign-aligned learner predictions into one normalised
    /// state, then evaluate the metric once.
    MeanOfPredictions,
}

/// Choice of subsystem A for entanglement measurements.
///
/// Subsystem A is always the leading `subsystem` qubits (the most
/// significant bits of the basis index). `None` selects `floor(n / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bipartition {
    /// Number of qubits in subsystem A.
    #[serde(default)]
    pub subsystem: Option<usize>,
}

impl Bipartition {
    /// Resolves the subsystem size for a register of `num_qubits` sites.
    pub fn resolve(&self, num_qubits: usize) -> Result<usize, PhyError> {
        let k = self.subsystem.unwrap_or(num_qubits / 2);
        if k > num_qubits {
            return Err(PhyError::Config(
                ErrorInfo::new("bipartition-size", "subsystem larger than register")
                    .with_context("subsystem", k.to_string())
                    .with_context("num_qubits", num_qubits.to_string()),
            ));
        }
        Ok(k)
    }
}

/// Norm used to size input perturbations and measure output divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerturbationNorm {
    /// Euclidean norm.
    #[default]
    L2,
    /// Maximum absolute component.
    LInf,
}

impl PerturbationNorm {
    /// Evaluates the norm of `values`.
    pub fn measure(self, values: &[f64]) -> f64 {
        match self {
            PerturbationNorm::L2 => values.iter().map(|v| v * v).sum::<f64>().sqrt(),
            PerturbationNorm::LInf => values.iter().fold(0.0f64, |acc, v| acc.max(v.abs())),
        }
    }
}

fn default_epsilon() -> f64 {
    1e-4
}

fn default_directions() -> usize {
    1
}

/// Settings of the finite-perturbation sensitivity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LyapunovConfig {
    /// Size of the input perturbation in the configured norm.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Norm applied to input perturbations and output differences.
    #[serde(default)]
    pub norm: PerturbationNorm,
    /// Random perturbation directions sampled per instance.
    #[serde(default = "default_directions")]
    pub directions: usize,
}

impl Default for LyapunovConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            norm: PerturbationNorm::default(),
            directions: default_directions(),
        }
    }
}

fn default_seed() -> u64 {
    0x0DDB_A11_5EED
}

fn default_parallel() -> bool {
    true
}

/// Run-level configuration of a [`crate::Model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Master seed; learner `i` is re-initialised from substream `i`.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Ensemble aggregation rule for every dataset-wide metric.
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Subsystem used for entanglement entropy.
    #[serde(default)]
    pub bipartition: Bipartition,
    /// Sensitivity estimate settings.
    #[serde(default)]
    pub lyapunov: LyapunovConfig,
    /// Eigenstate index learned and compared against (0 = ground state).
    #[serde(default)]
    pub target_level: usize,
    /// Evaluate learners and instances on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            aggregation: Aggregation::default(),
            bipartition: Bipartition::default(),
            lyapunov: LyapunovConfig::default(),
            target_level: 0,
            parallel: default_parallel(),
        }
    }
}

impl ModelConfig {
    /// Parses a YAML document, filling omitted fields with defaults.
    pub fn from_yaml(text: &str) -> Result<Self, PhyError> {
        let config: Self = serde_yaml::from_str(text).map_err(|err| {
            PhyError::Config(ErrorInfo::new("model-config-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that do not depend on the register size.
    pub fn validate(&self) -> Result<(), PhyError> {
        if !(self.lyapunov.epsilon > 0.0 && self.lyapunov.epsilon.is_finite()) {
            return Err(PhyError::Config(
                ErrorInfo::new("lyapunov-epsilon", "perturbation size must be positive")
                    .with_context("epsilon", self.lyapunov.epsilon.to_string()),
            ));
        }
        if self.lyapunov.directions == 0 {
            return Err(PhyError::Config(ErrorInfo::new(
                "lyapunov-directions",
                "at least one perturbation direction is required",
            )));
        }
        Ok(())
    }
}
