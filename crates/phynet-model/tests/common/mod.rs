#![allow(dead_code)]

use phynet_core::{Dataset, Network, RngHandle};
use phynet_gendat::{generate_dataset, GenConfig};
use phynet_model::{Model, ModelConfig};
use phynet_nn::{Adam, Infidelity, Mlp, MlpConfig};

/// Learner whose output is its own parameter vector, independent of the input.
#[derive(Debug, Clone)]
pub struct FreeState {
    num_qubits: usize,
    state: Vec<f64>,
}

impl FreeState {
    pub fn new(num_qubits: usize, state: Vec<f64>) -> Self {
        Self { num_qubits, state }
    }
}

impl Network for FreeState {
    fn input_len(&self) -> usize {
        3 * self.num_qubits
    }

    fn output_len(&self) -> usize {
        self.state.len()
    }

    fn forward(&self, _input: &[f64]) -> Vec<f64> {
        self.state.clone()
    }

    fn backward(&self, _input: &[f64], output_grad: &[f64]) -> Vec<f64> {
        output_grad.to_vec()
    }

    fn parameters(&self) -> &[f64] {
        &self.state
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.state
    }

    fn initialize(&mut self, rng: &mut RngHandle) {
        for value in &mut self.state {
            *value = rng.standard_normal();
        }
    }
}

pub fn dataset(num_qubits: usize, instances: usize) -> Dataset {
    generate_dataset(&GenConfig::new(num_qubits, instances)).unwrap()
}

pub fn mlp_model(
    num_qubits: usize,
    learners: usize,
    config: ModelConfig,
) -> Model<Mlp, Infidelity, Adam> {
    let mlp_config = MlpConfig {
        hidden: vec![16],
        ..MlpConfig::default()
    };
    let mut rng = RngHandle::from_seed(7);
    let networks = (0..learners)
        .map(|_| Mlp::new(3 * num_qubits, 1 << num_qubits, &mlp_config, &mut rng).unwrap())
        .collect();
    let mut model = Model::new(networks, Infidelity, Adam::new(1e-2), config).unwrap();
    model.reset();
    model
}

pub fn free_model(
    num_qubits: usize,
    states: Vec<Vec<f64>>,
    config: ModelConfig,
) -> Model<FreeState, Infidelity, Adam> {
    let networks = states
        .into_iter()
        .map(|state| FreeState::new(num_qubits, state))
        .collect();
    Model::new(networks, Infidelity, Adam::new(1e-2), config).unwrap()
}

/// Dataset holding exactly one instance of `source`.
pub fn single(source: &Dataset, index: usize) -> Dataset {
    let instance = source.instance(index).unwrap();
    let mut out = Dataset::new(source.num_qubits());
    out.push(
        instance.fields.clone(),
        instance.values.clone(),
        instance.wavefx.clone(),
    )
    .unwrap();
    out
}
