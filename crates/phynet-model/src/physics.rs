//! Dataset-wide physics metrics of a [`Model`].

use std::time::{Duration, Instant};

use phynet_core::{Dataset, Instance, Loss, Network, Optimizer, PhyError, RngHandle};
use phynet_gendat::total_magnetization;
use serde::{Deserialize, Serialize};

use crate::config::Aggregation;
use crate::metrics;
use crate::model::Model;

const LYAPUNOV_SALT: u64 = 0x4C59_4150;

/// Mean entanglement entropy of the predicted and the reference states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropySummary {
    /// Mean entropy of the ensemble predictions.
    pub predicted: f64,
    /// Mean entropy of the reference eigenstates.
    pub reference: f64,
}

/// Total `S^z` expectation of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetizationRow {
    /// Instance index within the dataset.
    pub index: usize,
    /// Expectation against the prediction.
    pub predicted: f64,
    /// Expectation against the reference state.
    pub reference: f64,
}

/// Per-instance overlap and entropy, as written by the `write_*` reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceScore {
    /// Instance index within the dataset.
    pub index: usize,
    /// Aggregated value for the instance.
    pub value: f64,
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let len = values.len();
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

impl<N, L, O> Model<N, L, O>
where
    N: Network,
    L: Loss,
    O: Optimizer,
{
    /// Combines `metric` over the ensemble predictions for one input using
    /// the configured aggregation rule.
    fn aggregate<F>(&self, predictions: &[Vec<f64>], metric: F) -> f64
    where
        F: Fn(&[f64]) -> f64,
    {
        match self.config.aggregation {
            Aggregation::MeanOfMetrics => mean(predictions.iter().map(|p| metric(p.as_slice()))),
            Aggregation::MeanOfPredictions => metric(&metrics::aligned_mean(predictions)),
        }
    }

    fn scores<F>(&self, dataset: &Dataset, metric: F) -> Result<Vec<InstanceScore>, PhyError>
    where
        F: Fn(&[f64], &[f64]) -> f64 + Sync + Send,
    {
        self.check_compatible(dataset)?;
        Ok(self.per_instance(dataset, |instance: Instance<'_>| {
            let reference = self.target(&instance);
            let predictions = self.predictions(&instance.fields.to_input());
            InstanceScore {
                index: instance.index,
                value: self.aggregate(&predictions, |p| metric(p, reference.as_slice())),
            }
        }))
    }

    /// Mean squared error between the (sign-aligned) predicted and reference
    /// states, averaged over instances and aggregated over the ensemble.
    pub fn mse(&self, dataset: &Dataset) -> Result<f64, PhyError> {
        let scores = self.scores(dataset, metrics::aligned_mse)?;
        Ok(mean(scores.iter().map(|s| s.value)))
    }

    /// Per-instance fidelity `|<psi_pred, psi_ref>|`.
    pub fn instance_overlaps(&self, dataset: &Dataset) -> Result<Vec<InstanceScore>, PhyError> {
        self.scores(dataset, metrics::fidelity)
    }

    /// Mean fidelity over the dataset, in `[0, 1]`.
    pub fn overlap(&self, dataset: &Dataset) -> Result<f64, PhyError> {
        let scores = self.instance_overlaps(dataset)?;
        Ok(mean(scores.iter().map(|s| s.value)))
    }

    /// Entanglement entropy of `psi` across the configured bipartition.
    pub fn entanglement_entropy(&self, psi: &[f64]) -> Result<f64, PhyError> {
        let dim = 1usize << self.num_qubits;
        if psi.len() != dim {
            return Err(PhyError::shape(
                "state-dimension",
                "state length differs from 2^num_qubits",
                dim,
                psi.len(),
            ));
        }
        Ok(metrics::entanglement_entropy(psi, self.num_qubits, self.subsystem))
    }

    /// Per-instance entropy of the predicted and reference states.
    pub fn instance_entropies(
        &self,
        dataset: &Dataset,
    ) -> Result<Vec<(InstanceScore, InstanceScore)>, PhyError> {
        self.check_compatible(dataset)?;
        let (n, k) = (self.num_qubits, self.subsystem);
        Ok(self.per_instance(dataset, |instance: Instance<'_>| {
            let predictions = self.predictions(&instance.fields.to_input());
            let predicted = self.aggregate(&predictions, |p| metrics::entanglement_entropy(p, n, k));
            let reference = metrics::entanglement_entropy(&self.target(&instance), n, k);
            (
                InstanceScore {
                    index: instance.index,
                    value: predicted,
                },
                InstanceScore {
                    index: instance.index,
                    value: reference,
                },
            )
        }))
    }

    /// Mean entanglement entropy of predictions and references.
    pub fn mean_entanglement_entropy(&self, dataset: &Dataset) -> Result<EntropySummary, PhyError> {
        let rows = self.instance_entropies(dataset)?;
        Ok(EntropySummary {
            predicted: mean(rows.iter().map(|(p, _)| p.value)),
            reference: mean(rows.iter().map(|(_, r)| r.value)),
        })
    }

    /// Total magnetization `Σ σᶻ` of every instance for prediction and reference.
    pub fn magnetization(&self, dataset: &Dataset) -> Result<Vec<MagnetizationRow>, PhyError> {
        self.check_compatible(dataset)?;
        let operator = total_magnetization(self.num_qubits);
        Ok(self.per_instance(dataset, |instance: Instance<'_>| {
            let predictions = self.predictions(&instance.fields.to_input());
            MagnetizationRow {
                index: instance.index,
                predicted: self.aggregate(&predictions, |p| operator.expectation(p)),
                reference: operator.expectation(&self.target(&instance)),
            }
        }))
    }

    /// Mean absolute magnetization error per site.
    pub fn average_sz_error(&self, dataset: &Dataset) -> Result<f64, PhyError> {
        let rows = self.magnetization(dataset)?;
        let sites = self.num_qubits.max(1) as f64;
        Ok(mean(
            rows.iter()
                .map(|row| (row.predicted - row.reference).abs() / sites),
        ))
    }

    /// Finite-perturbation sensitivity of the learned map.
    ///
    /// Each instance input is displaced by `epsilon` (in the configured norm)
    /// along seeded random directions; the result is the mean of
    /// `ln(|Δψ| / |δ|)`. Samples whose output does not move are skipped.
    pub fn lyapunov_estimate(&self, dataset: &Dataset) -> Result<f64, PhyError> {
        Ok(mean(self.lyapunov_samples(dataset)?.into_iter()))
    }

    /// Per-instance mean of the log divergence ratios; instances without a
    /// usable sample are omitted.
    pub fn instance_lyapunov(&self, dataset: &Dataset) -> Result<Vec<InstanceScore>, PhyError> {
        self.check_compatible(dataset)?;
        let rows = self.per_instance(dataset, |instance: Instance<'_>| {
            let samples = self.instance_log_ratios(&instance);
            (!samples.is_empty()).then(|| InstanceScore {
                index: instance.index,
                value: mean(samples.into_iter()),
            })
        });
        Ok(rows.into_iter().flatten().collect())
    }

    fn lyapunov_samples(&self, dataset: &Dataset) -> Result<Vec<f64>, PhyError> {
        self.check_compatible(dataset)?;
        let per_instance = self.per_instance(dataset, |instance: Instance<'_>| {
            self.instance_log_ratios(&instance)
        });
        Ok(per_instance.into_iter().flatten().collect())
    }

    fn instance_log_ratios(&self, instance: &Instance<'_>) -> Vec<f64> {
        let settings = self.config.lyapunov;
        let input = instance.fields.to_input();
        let mut samples = Vec::with_capacity(settings.directions);
        for direction in 0..settings.directions {
            let stream = (instance.index * settings.directions + direction) as u64;
            let mut rng = RngHandle::substream(self.config.seed ^ LYAPUNOV_SALT, stream);
            let raw: Vec<f64> = input.iter().map(|_| rng.standard_normal()).collect();
            let length = settings.norm.measure(&raw);
            if length <= f64::EPSILON {
                continue;
            }
            let perturbed: Vec<f64> = input
                .iter()
                .zip(&raw)
                .map(|(x, d)| x + d * settings.epsilon / length)
                .collect();
            let ratios = self.divergences(&input, &perturbed);
            samples.extend(
                ratios
                    .into_iter()
                    .filter(|ratio| *ratio > 0.0 && ratio.is_finite())
                    .map(f64::ln),
            );
        }
        samples
    }

    fn divergences(&self, input: &[f64], perturbed: &[f64]) -> Vec<f64> {
        let settings = self.config.lyapunov;
        let ratio = |a: &[f64], b: &[f64]| {
            let delta: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
            settings.norm.measure(&delta) / settings.epsilon
        };
        let base = self.predictions(input);
        let moved = self.predictions(perturbed);
        match self.config.aggregation {
            Aggregation::MeanOfMetrics => base
                .iter()
                .zip(&moved)
                .map(|(a, b)| ratio(a.as_slice(), b.as_slice()))
                .collect(),
            Aggregation::MeanOfPredictions => vec![ratio(
                &metrics::aligned_mean(&base),
                &metrics::aligned_mean(&moved),
            )],
        }
    }

    /// Wall-clock time of one forward pass of every learner over the dataset.
    pub fn inference_time(&self, dataset: &Dataset) -> Result<Duration, PhyError> {
        self.check_compatible(dataset)?;
        let started = Instant::now();
        for instance in dataset.iter() {
            let input = instance.fields.to_input();
            for network in &self.networks {
                std::hint::black_box(network.forward(&input));
            }
        }
        Ok(started.elapsed())
    }
}
