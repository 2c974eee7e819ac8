//! Persistence of metric snapshots and the plain-text summaries.
//!
//! Every file written here is opened in append mode. A header row is emitted
//! only when the file is new or empty, so repeated trials share one table.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{Writer, WriterBuilder};
use phynet_core::{Dataset, ErrorInfo, Loss, Network, Optimizer, PhyError};
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Column layout of [`Model::append_metrics`].
pub const METRICS_HEADER: [&str; 8] = [
    "trial",
    "epoch",
    "mse",
    "overlap",
    "entropy",
    "entropy_ref",
    "sz_error",
    "lyapunov",
];

/// Snapshot of every dataset-wide metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    /// Aligned state MSE.
    pub mse: f64,
    /// Mean fidelity.
    pub overlap: f64,
    /// Mean entropy of the predictions.
    pub entropy: f64,
    /// Mean entropy of the references.
    pub entropy_ref: f64,
    /// Mean per-site magnetization error.
    pub sz_error: f64,
    /// Sensitivity estimate.
    pub lyapunov: f64,
}

/// One metric observation in long format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Trial index.
    pub trial: usize,
    /// Epoch index within the trial.
    pub epoch: usize,
    /// Metric name, one of the [`METRICS_HEADER`] value columns.
    pub metric: String,
    /// Observed value.
    pub value: f64,
}

impl MetricBundle {
    /// Values in [`METRICS_HEADER`] order, without trial and epoch.
    pub fn values(&self) -> [f64; 6] {
        [
            self.mse,
            self.overlap,
            self.entropy,
            self.entropy_ref,
            self.sz_error,
            self.lyapunov,
        ]
    }

    /// Splits the bundle into one record per metric.
    pub fn records(&self, trial: usize, epoch: usize) -> Vec<MetricRecord> {
        METRICS_HEADER[2..]
            .iter()
            .zip(self.values())
            .map(|(name, value)| MetricRecord {
                trial,
                epoch,
                metric: (*name).to_string(),
                value,
            })
            .collect()
    }
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> PhyError {
    PhyError::Io(
        ErrorInfo::new(code, "metric table write failed")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// Opens `path` for appending and writes `header` when the file holds nothing yet.
fn open_table(path: &Path, header: &[&str]) -> Result<Writer<BufWriter<File>>, PhyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| PhyError::io("metrics-dir", parent, err))?;
    }
    let fresh = fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| PhyError::io("metrics-open", path, err))?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    if fresh {
        writer
            .write_record(header)
            .map_err(|err| wrap_csv("metrics-write-header", path, err))?;
    }
    Ok(writer)
}

pub(crate) fn append_table<I>(path: &Path, header: &[&str], rows: I) -> Result<(), PhyError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = open_table(path, header)?;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|err| wrap_csv("metrics-write-row", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| PhyError::io("metrics-flush", path, err))
}

fn summary_error(err: std::io::Error) -> PhyError {
    PhyError::Io(ErrorInfo::new("summary-write", err.to_string()))
}

impl<N, L, O> Model<N, L, O>
where
    N: Network,
    L: Loss,
    O: Optimizer,
{
    /// Evaluates every dataset-wide metric once.
    pub fn metric_bundle(&self, dataset: &Dataset) -> Result<MetricBundle, PhyError> {
        let entropy = self.mean_entanglement_entropy(dataset)?;
        Ok(MetricBundle {
            mse: self.mse(dataset)?,
            overlap: self.overlap(dataset)?,
            entropy: entropy.predicted,
            entropy_ref: entropy.reference,
            sz_error: self.average_sz_error(dataset)?,
            lyapunov: self.lyapunov_estimate(dataset)?,
        })
    }

    /// Computes the metric bundle and appends one `(trial, epoch, ...)` row
    /// to `path`.
    pub fn append_metrics(
        &self,
        dataset: &Dataset,
        trial: usize,
        epoch: usize,
        path: &Path,
    ) -> Result<MetricBundle, PhyError> {
        let bundle = self.metric_bundle(dataset)?;
        let mut row = vec![trial.to_string(), epoch.to_string()];
        row.extend(bundle.values().iter().map(f64::to_string));
        append_table(path, &METRICS_HEADER, [row])?;
        tracing::info!(
            trial,
            epoch,
            mse = bundle.mse,
            overlap = bundle.overlap,
            "metrics appended"
        );
        Ok(bundle)
    }

    /// Appends the per-instance fidelity of `trial` to `path`.
    pub fn write_overlap(
        &self,
        dataset: &Dataset,
        trial: usize,
        path: &Path,
    ) -> Result<(), PhyError> {
        let rows = self.instance_overlaps(dataset)?;
        append_table(
            path,
            &["trial", "index", "overlap"],
            rows.iter().map(|s| {
                vec![trial.to_string(), s.index.to_string(), s.value.to_string()]
            }),
        )
    }

    /// Appends the per-instance predicted and reference entropies to `path`.
    pub fn write_entanglement_entropy(
        &self,
        dataset: &Dataset,
        trial: usize,
        path: &Path,
    ) -> Result<(), PhyError> {
        let rows = self.instance_entropies(dataset)?;
        append_table(
            path,
            &["trial", "index", "entropy", "entropy_ref"],
            rows.iter().map(|(predicted, reference)| {
                vec![
                    trial.to_string(),
                    predicted.index.to_string(),
                    predicted.value.to_string(),
                    reference.value.to_string(),
                ]
            }),
        )
    }

    /// Appends the per-instance total magnetization to `path`.
    pub fn write_magnetization(
        &self,
        dataset: &Dataset,
        trial: usize,
        path: &Path,
    ) -> Result<(), PhyError> {
        let rows = self.magnetization(dataset)?;
        append_table(
            path,
            &["trial", "index", "sz", "sz_ref"],
            rows.iter().map(|row| {
                vec![
                    trial.to_string(),
                    row.index.to_string(),
                    row.predicted.to_string(),
                    row.reference.to_string(),
                ]
            }),
        )
    }

    /// Appends the per-instance sensitivity estimate to `path`.
    pub fn write_lyapunov_estimate(
        &self,
        dataset: &Dataset,
        trial: usize,
        path: &Path,
    ) -> Result<(), PhyError> {
        let rows = self.instance_lyapunov(dataset)?;
        append_table(
            path,
            &["trial", "index", "lyapunov"],
            rows.iter().map(|s| {
                vec![trial.to_string(), s.index.to_string(), s.value.to_string()]
            }),
        )
    }

    /// Prints the mean fidelity.
    pub fn print_average_overlap<W: Write>(
        &self,
        dataset: &Dataset,
        out: &mut W,
    ) -> Result<(), PhyError> {
        let overlap = self.overlap(dataset)?;
        writeln!(out, "Average overlap: {overlap:.6}").map_err(summary_error)
    }

    /// Prints the mean per-site magnetization error.
    pub fn print_average_sz_error<W: Write>(
        &self,
        dataset: &Dataset,
        out: &mut W,
    ) -> Result<(), PhyError> {
        let error = self.average_sz_error(dataset)?;
        writeln!(out, "Average Sz error: {error:.6}").map_err(summary_error)
    }

    /// Times one ensemble pass over the dataset and prints it.
    pub fn print_inference_time<W: Write>(
        &self,
        dataset: &Dataset,
        out: &mut W,
    ) -> Result<(), PhyError> {
        let elapsed = self.inference_time(dataset)?;
        let per_instance = if dataset.is_empty() {
            0.0
        } else {
            elapsed.as_secs_f64() * 1e6 / dataset.len() as f64
        };
        writeln!(
            out,
            "Inference time: {:.3} ms ({per_instance:.2} us per instance, {} learners)",
            elapsed.as_secs_f64() * 1e3,
            self.ensemble_size()
        )
        .map_err(summary_error)
    }
}
