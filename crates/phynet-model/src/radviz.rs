//! Radial (RadViz) projection of non-negative weight vectors onto the plane.

use std::f64::consts::TAU;
use std::path::Path;

use phynet_core::{Dataset, Instance, Loss, Network, Optimizer, PhyError};

use crate::model::Model;
use crate::report::append_table;

/// Anchors used when projecting learner parameters.
pub const PARAMETER_ANCHORS: usize = 8;

/// Projects `weights` to `Σ w_k a_k / Σ w_k`, where anchor `a_k` sits at
/// angle `2πk / len` on the unit circle. Negative weights count as zero and
/// an all-zero vector maps to the origin.
pub fn radviz(weights: &[f64]) -> (f64, f64) {
    let len = weights.len() as f64;
    let (mut x, mut y, mut total) = (0.0, 0.0, 0.0);
    for (k, w) in weights.iter().enumerate() {
        let w = w.max(0.0);
        let angle = TAU * k as f64 / len;
        x += w * angle.cos();
        y += w * angle.sin();
        total += w;
    }
    if total <= f64::EPSILON {
        return (0.0, 0.0);
    }
    (x / total, y / total)
}

/// Sums `|v|` over `anchors` contiguous, nearly equal chunks of `values`.
pub fn bucket(values: &[f64], anchors: usize) -> Vec<f64> {
    let mut buckets = vec![0.0; anchors];
    if anchors == 0 || values.is_empty() {
        return buckets;
    }
    for (i, v) in values.iter().enumerate() {
        buckets[i * anchors / values.len()] += v.abs();
    }
    buckets
}

fn probabilities(psi: &[f64]) -> Vec<f64> {
    psi.iter().map(|c| c * c).collect()
}

impl<N, L, O> Model<N, L, O>
where
    N: Network,
    L: Loss,
    O: Optimizer,
{
    /// Appends, per instance, the RadViz coordinates of the reference and
    /// predicted basis probabilities `|c_k|²`.
    pub fn write_radial_visualization(
        &self,
        dataset: &Dataset,
        trial: usize,
        path: &Path,
    ) -> Result<(), PhyError> {
        self.check_compatible(dataset)?;
        let rows = self.per_instance(dataset, |instance: Instance<'_>| {
            let (rx, ry) = radviz(&probabilities(&self.target(&instance)));
            let (px, py) = radviz(&probabilities(&self.predict(instance.fields)));
            vec![
                trial.to_string(),
                instance.index.to_string(),
                rx.to_string(),
                ry.to_string(),
                px.to_string(),
                py.to_string(),
            ]
        });
        append_table(
            path,
            &["trial", "index", "ref_x", "ref_y", "pred_x", "pred_y"],
            rows,
        )
    }

    /// Appends one row per learner with the RadViz coordinates of its
    /// parameter magnitudes bucketed onto [`PARAMETER_ANCHORS`] anchors.
    pub fn append_wandb_for_radviz(
        &self,
        trial: usize,
        epoch: usize,
        path: &Path,
    ) -> Result<(), PhyError> {
        let rows = self.networks.iter().enumerate().map(|(learner, network)| {
            let (x, y) = radviz(&bucket(network.parameters(), PARAMETER_ANCHORS));
            vec![
                trial.to_string(),
                epoch.to_string(),
                learner.to_string(),
                x.to_string(),
                y.to_string(),
            ]
        });
        append_table(path, &["trial", "epoch", "learner", "x", "y"], rows)
    }
}
