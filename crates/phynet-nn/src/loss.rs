use phynet_core::Loss;
use serde::{Deserialize, Serialize};

/// Mean squared error over state components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanSquared;

impl Loss for MeanSquared {
    fn evaluate(&self, predicted: &[f64], target: &[f64]) -> f64 {
        if predicted.is_empty() {
            return 0.0;
        }
        let sum: f64 = predicted
            .iter()
            .zip(target)
            .map(|(p, t)| (p - t) * (p - t))
            .sum();
        sum / predicted.len() as f64
    }

    fn gradient(&self, predicted: &[f64], target: &[f64]) -> Vec<f64> {
        let scale = 2.0 / predicted.len().max(1) as f64;
        predicted
            .iter()
            .zip(target)
            .map(|(p, t)| scale * (p - t))
            .collect()
    }
}

/// Sign-invariant infidelity `1 - <p,t>^2 / (|p|^2 |t|^2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Infidelity;

fn moments(predicted: &[f64], target: &[f64]) -> (f64, f64, f64) {
    let mut overlap = 0.0;
    let mut pp = 0.0;
    let mut tt = 0.0;
    for (p, t) in predicted.iter().zip(target) {
        overlap += p * t;
        pp += p * p;
        tt += t * t;
    }
    (overlap, pp, tt)
}

impl Loss for Infidelity {
    fn evaluate(&self, predicted: &[f64], target: &[f64]) -> f64 {
        let (overlap, pp, tt) = moments(predicted, target);
        if pp <= f64::EPSILON || tt <= f64::EPSILON {
            return 1.0;
        }
        (1.0 - overlap * overlap / (pp * tt)).max(0.0)
    }

    fn gradient(&self, predicted: &[f64], target: &[f64]) -> Vec<f64> {
        let (overlap, pp, tt) = moments(predicted, target);
        if pp <= f64::EPSILON || tt <= f64::EPSILON {
            return vec![0.0; predicted.len()];
        }
        let a = 2.0 * overlap / (pp * tt);
        let b = 2.0 * overlap * overlap / (pp * pp * tt);
        predicted
            .iter()
            .zip(target)
            .map(|(p, t)| b * p - a * t)
            .collect()
    }
}

/// Serializable choice of loss functional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LossSpec {
    /// [`MeanSquared`].
    MeanSquared,
    /// [`Infidelity`].
    #[default]
    Infidelity,
}

/// Loss selected at runtime from a [`LossSpec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateLoss {
    /// Mean squared error.
    MeanSquared(MeanSquared),
    /// Infidelity.
    Infidelity(Infidelity),
}

impl LossSpec {
    /// Instantiates the selected loss.
    pub fn build(self) -> StateLoss {
        match self {
            LossSpec::MeanSquared => StateLoss::MeanSquared(MeanSquared),
            LossSpec::Infidelity => StateLoss::Infidelity(Infidelity),
        }
    }
}

impl Loss for StateLoss {
    fn evaluate(&self, predicted: &[f64], target: &[f64]) -> f64 {
        match self {
            StateLoss::MeanSquared(loss) => loss.evaluate(predicted, target),
            StateLoss::Infidelity(loss) => loss.evaluate(predicted, target),
        }
    }

    fn gradient(&self, predicted: &[f64], target: &[f64]) -> Vec<f64> {
        match self {
            StateLoss::MeanSquared(loss) => loss.gradient(predicted, target),
            StateLoss::Infidelity(loss) => loss.gradient(predicted, target),
        }
    }
}
