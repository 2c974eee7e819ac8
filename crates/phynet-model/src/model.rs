use phynet_core::{Dataset, ErrorInfo, FieldRecord, Instance, Loss, Network, Optimizer, PhyError, RngHandle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::metrics;

/// Mean training loss of every learner over one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassStats {
    /// Mean loss per learner, in ensemble order, before the update.
    pub learner_loss: Vec<f64>,
}

impl PassStats {
    /// Mean loss across the ensemble.
    pub fn mean(&self) -> f64 {
        if self.learner_loss.is_empty() {
            return 0.0;
        }
        self.learner_loss.iter().sum::<f64>() / self.learner_loss.len() as f64
    }
}

/// Owns an ensemble of learners together with the loss and one optimizer
/// per learner, and drives training and evaluation over datasets.
///
/// Every learner is paired with its own optimizer clone, so no update ever
/// reads another learner's parameters or moments.
#[derive(Debug, Clone)]
pub struct Model<N, L, O> {
    pub(crate) networks: Vec<N>,
    pub(crate) optimizers: Vec<O>,
    pub(crate) prototype: O,
    pub(crate) loss: L,
    pub(crate) config: ModelConfig,
    pub(crate) num_qubits: usize,
    pub(crate) subsystem: usize,
}

impl<N, L, O> Model<N, L, O>
where
    N: Network,
    L: Loss,
    O: Optimizer,
{
    /// Takes ownership of the ensemble, the loss and the optimizer prototype.
    ///
    /// All learners must share one input/output shape, the output length
    /// must be `2^n` and the input length `3n` for some register size `n`.
    pub fn new(
        networks: Vec<N>,
        loss: L,
        optimizer: O,
        config: ModelConfig,
    ) -> Result<Self, PhyError> {
        config.validate()?;
        let Some(first) = networks.first() else {
            return Err(PhyError::Config(ErrorInfo::new(
                "empty-ensemble",
                "a model needs at least one learner",
            )));
        };
        let (input_len, output_len) = (first.input_len(), first.output_len());
        if !output_len.is_power_of_two() {
            return Err(PhyError::Shape(
                ErrorInfo::new("output-dimension", "network output must have length 2^n")
                    .with_context("output", output_len.to_string()),
            ));
        }
        let num_qubits = output_len.trailing_zeros() as usize;
        if input_len != 3 * num_qubits {
            return Err(PhyError::shape(
                "input-dimension",
                "network input must hold three fields per qubit",
                3 * num_qubits,
                input_len,
            ));
        }
        for (index, network) in networks.iter().enumerate() {
            if network.input_len() != input_len || network.output_len() != output_len {
                return Err(PhyError::Shape(
                    ErrorInfo::new("ensemble-shape", "learners disagree on their shape")
                        .with_context("learner", index.to_string()),
                ));
            }
        }
        if config.target_level >= output_len {
            return Err(PhyError::shape(
                "target-level",
                "target eigenstate index exceeds the state dimension",
                output_len,
                config.target_level,
            ));
        }
        let subsystem = config.bipartition.resolve(num_qubits)?;
        let optimizers = vec![optimizer.clone(); networks.len()];
        Ok(Self {
            networks,
            optimizers,
            prototype: optimizer,
            loss,
            config,
            num_qubits,
            subsystem,
        })
    }

    /// Number of learners.
    pub fn ensemble_size(&self) -> usize {
        self.networks.len()
    }

    /// Learners in ensemble order.
    pub fn networks(&self) -> &[N] {
        &self.networks
    }

    /// Run configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Register size the ensemble was built for.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Resolved size of entanglement subsystem A.
    pub fn subsystem(&self) -> usize {
        self.subsystem
    }

    /// Re-initialises every learner from its seed substream and discards all
    /// optimizer state. Calling it repeatedly yields the same parameters.
    pub fn reset(&mut self) {
        let seed = self.config.seed;
        for (index, network) in self.networks.iter_mut().enumerate() {
            let mut rng = RngHandle::substream(seed, index as u64);
            network.initialize(&mut rng);
        }
        for optimizer in &mut self.optimizers {
            *optimizer = self.prototype.clone();
            optimizer.reset();
        }
        tracing::debug!(learners = self.networks.len(), seed, "ensemble reset");
    }

    /// Fails when `dataset` does not match the register the ensemble was built for.
    pub fn check_compatible(&self, dataset: &Dataset) -> Result<(), PhyError> {
        if dataset.num_qubits() != self.num_qubits {
            return Err(PhyError::shape(
                "dataset-register",
                "dataset register size differs from the ensemble",
                self.num_qubits,
                dataset.num_qubits(),
            ));
        }
        Ok(())
    }

    /// One full-batch pass: every learner accumulates the mean loss gradient
    /// over all instances and takes a single optimizer step.
    ///
    /// Gradients are summed in instance order after being computed, so the
    /// result does not depend on scheduling.
    pub fn train(&mut self, dataset: &Dataset) -> Result<PassStats, PhyError> {
        self.check_compatible(dataset)?;
        let stats = self.update(dataset);
        tracing::debug!(
            instances = dataset.len(),
            mean_loss = stats.mean(),
            "training pass complete"
        );
        Ok(stats)
    }

    /// Same parameter update as [`Model::train`] without reporting.
    pub fn learn_from(&mut self, dataset: &Dataset) -> Result<(), PhyError> {
        self.check_compatible(dataset)?;
        self.update(dataset);
        Ok(())
    }

    fn update(&mut self, dataset: &Dataset) -> PassStats {
        if dataset.is_empty() {
            return PassStats {
                learner_loss: vec![0.0; self.networks.len()],
            };
        }
        let loss = &self.loss;
        let level = self.config.target_level;
        let parallel = self.config.parallel;
        let step = |(network, optimizer): (&mut N, &mut O)| -> f64 {
            let (mean_loss, gradient) = batch_gradient(network, loss, dataset, level, parallel);
            optimizer.step(network.parameters_mut(), &gradient);
            mean_loss
        };
        let learner_loss = if parallel {
            self.networks
                .par_iter_mut()
                .zip(self.optimizers.par_iter_mut())
                .map(step)
                .collect()
        } else {
            self.networks
                .iter_mut()
                .zip(self.optimizers.iter_mut())
                .map(step)
                .collect()
        };
        PassStats { learner_loss }
    }

    /// Unit-normalised prediction of every learner for one input.
    pub fn predictions(&self, input: &[f64]) -> Vec<Vec<f64>> {
        self.networks
            .iter()
            .map(|network| metrics::normalized(&network.forward(input)))
            .collect()
    }

    /// Ensemble prediction: the sign-aligned, normalised mean of the learners.
    pub fn predict(&self, fields: &FieldRecord) -> Vec<f64> {
        metrics::aligned_mean(&self.predictions(&fields.to_input()))
    }

    /// Maps `f` over every instance, on the rayon pool when enabled. Results
    /// stay in instance order.
    pub(crate) fn per_instance<T, F>(&self, dataset: &Dataset, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Instance<'_>) -> T + Sync + Send,
    {
        if self.config.parallel {
            (0..dataset.len())
                .into_par_iter()
                .filter_map(|index| dataset.instance(index))
                .map(&f)
                .collect()
        } else {
            dataset.iter().map(f).collect()
        }
    }

    pub(crate) fn target(&self, instance: &Instance<'_>) -> Vec<f64> {
        instance.eigenstate(self.config.target_level)
    }
}

fn batch_gradient<N: Network, L: Loss>(
    network: &N,
    loss: &L,
    dataset: &Dataset,
    level: usize,
    parallel: bool,
) -> (f64, Vec<f64>) {
    let contribution = |instance: Instance<'_>| -> (f64, Vec<f64>) {
        let input = instance.fields.to_input();
        let target = instance.eigenstate(level);
        let output = network.forward(&input);
        let value = loss.evaluate(&output, &target);
        let grad = network.backward(&input, &loss.gradient(&output, &target));
        (value, grad)
    };
    let parts: Vec<(f64, Vec<f64>)> = if parallel {
        (0..dataset.len())
            .into_par_iter()
            .filter_map(|index| dataset.instance(index))
            .map(contribution)
            .collect()
    } else {
        dataset.iter().map(contribution).collect()
    };

    let scale = 1.0 / parts.len().max(1) as f64;
    let mut total_loss = 0.0;
    let mut gradient = vec![0.0; network.parameters().len()];
    for (value, grad) in parts {
        total_loss += value;
        for (acc, g) in gradient.iter_mut().zip(grad) {
            *acc += g;
        }
    }
    gradient.iter_mut().for_each(|g| *g *= scale);
    (total_loss * scale, gradient)
}
