use phynet_core::{Dataset, ErrorInfo, FieldRecord, PhyError, RngHandle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::hamiltonian::{solve, Boundary};

/// Largest register the dense exact-diagonalisation path accepts.
pub const MAX_QUBITS: usize = 12;

/// Closed-open sampling interval for one family of fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (exclusive).
    pub high: f64,
}

impl FieldRange {
    /// Creates a new range.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

fn default_instances() -> usize {
    64
}

fn default_coupling() -> FieldRange {
    FieldRange::new(0.5, 1.5)
}

fn default_transverse() -> FieldRange {
    FieldRange::new(0.0, 2.0)
}

fn default_longitudinal() -> FieldRange {
    FieldRange::new(-0.1, 0.1)
}

fn default_seed() -> u64 {
    0x5EED_0F_F1E1D
}

/// Parameters for synthetic dataset generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Sites per chain.
    pub num_qubits: usize,
    /// Number of instances to generate.
    #[serde(default = "default_instances")]
    pub instances: usize,
    /// Sampling interval for the couplings `J_i`.
    #[serde(default = "default_coupling")]
    pub coupling: FieldRange,
    /// Sampling interval for the transverse fields `Bx_i`.
    #[serde(default = "default_transverse")]
    pub transverse: FieldRange,
    /// Sampling interval for the longitudinal fields `Bz_i`.
    #[serde(default = "default_longitudinal")]
    pub longitudinal: FieldRange,
    /// Draw one value per family and share it across sites.
    #[serde(default)]
    pub homogeneous: bool,
    /// Chain boundary condition.
    #[serde(default)]
    pub boundary: Boundary,
    /// Master seed; instance `i` samples from substream `i`.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl GenConfig {
    /// Creates a configuration with default sampling ranges.
    pub fn new(num_qubits: usize, instances: usize) -> Self {
        Self {
            num_qubits,
            instances,
            coupling: default_coupling(),
            transverse: default_transverse(),
            longitudinal: default_longitudinal(),
            homogeneous: false,
            boundary: Boundary::default(),
            seed: default_seed(),
        }
    }

    /// Parses a YAML configuration document.
    pub fn from_yaml(text: &str) -> Result<Self, PhyError> {
        serde_yaml::from_str(text)
            .map_err(|err| PhyError::Config(ErrorInfo::new("gen-config-parse", err.to_string())))
    }

    fn validate(&self) -> Result<(), PhyError> {
        if self.num_qubits == 0 || self.num_qubits > MAX_QUBITS {
            return Err(PhyError::Config(
                ErrorInfo::new("gen-num-qubits", "num_qubits outside supported range")
                    .with_context("num_qubits", self.num_qubits.to_string())
                    .with_hint(format!("use 1..={MAX_QUBITS}")),
            ));
        }
        if self.instances == 0 {
            return Err(PhyError::Config(ErrorInfo::new(
                "gen-instances",
                "at least one instance is required",
            )));
        }
        Ok(())
    }

    fn sample_fields(&self, index: usize) -> FieldRecord {
        let mut rng = RngHandle::substream(self.seed, index as u64);
        let n = self.num_qubits;
        let mut draw = |range: FieldRange| -> Vec<f64> {
            if self.homogeneous {
                vec![rng.uniform(range.low, range.high); n]
            } else {
                (0..n).map(|_| rng.uniform(range.low, range.high)).collect()
            }
        };
        let coupling = draw(self.coupling);
        let transverse = draw(self.transverse);
        let longitudinal = draw(self.longitudinal);
        FieldRecord {
            coupling,
            transverse,
            longitudinal,
        }
    }
}

/// Samples field records and solves each chain exactly.
pub fn generate_dataset(config: &GenConfig) -> Result<Dataset, PhyError> {
    config.validate()?;
    let solved: Vec<_> = (0..config.instances)
        .into_par_iter()
        .map(|index| {
            let fields = config.sample_fields(index);
            let spectrum = solve(&fields, config.boundary);
            (fields, spectrum)
        })
        .collect();

    let mut dataset = Dataset::with_capacity(config.num_qubits, solved.len());
    for (fields, spectrum) in solved {
        dataset.push(fields, spectrum.values, spectrum.vectors)?;
    }
    tracing::info!(
        num_qubits = config.num_qubits,
        instances = dataset.len(),
        "generated dataset"
    );
    Ok(dataset)
}
