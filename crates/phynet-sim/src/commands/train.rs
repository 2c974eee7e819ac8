use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Args;
use phynet_model::MetricBundle;
use serde::Serialize;

use super::{build_model, read_dataset};
use crate::config::RunConfig;
use crate::write_json;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Training dataset.
    #[arg(long)]
    pub train: PathBuf,
    /// Evaluation dataset; defaults to the training set.
    #[arg(long)]
    pub test: Option<PathBuf>,
    /// Run directory receiving metrics, checkpoint and manifest.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    config: &'a RunConfig,
    config_hash: String,
    train: String,
    test: String,
    train_instances: usize,
    test_instances: usize,
    final_metrics: Option<MetricBundle>,
}

pub fn run(args: &TrainArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    fs::create_dir_all(&args.out)?;
    let train = read_dataset(&config, &args.train)?;
    let test_path = args.test.clone().unwrap_or_else(|| args.train.clone());
    let test = if args.test.is_some() {
        read_dataset(&config, &test_path)?
    } else {
        train.clone()
    };

    let outputs = &config.outputs;
    let path = |name: &str| args.out.join(name);
    let mut model = build_model(&config)?;
    let mut last = None;
    for trial in 0..config.trials {
        model.reset();
        for epoch in 0..config.epochs {
            let stats = model.train(&train)?;
            let report = epoch % config.report_every == 0 || epoch + 1 == config.epochs;
            if report {
                last = Some(model.append_metrics(&test, trial, epoch, &path(&outputs.metrics))?);
                model.append_wandb_for_radviz(trial, epoch, &path(&outputs.wandb))?;
                tracing::info!(trial, epoch, loss = stats.mean(), "epoch complete");
            }
        }
        model.write_overlap(&test, trial, &path(&outputs.overlap))?;
        model.write_entanglement_entropy(&test, trial, &path(&outputs.entropy))?;
        model.write_magnetization(&test, trial, &path(&outputs.magnetization))?;
        model.write_lyapunov_estimate(&test, trial, &path(&outputs.lyapunov))?;
        model.write_radial_visualization(&test, trial, &path(&outputs.radviz))?;
        tracing::info!(trial, "trial complete");
    }
    model.save(&path(&outputs.checkpoint))?;

    let mut stdout = io::stdout().lock();
    model.print_average_overlap(&test, &mut stdout)?;
    model.print_average_sz_error(&test, &mut stdout)?;
    model.print_inference_time(&test, &mut stdout)?;

    let manifest = RunManifest {
        config: &config,
        config_hash: config.hash()?,
        train: args.train.display().to_string(),
        test: test_path.display().to_string(),
        train_instances: train.len(),
        test_instances: test.len(),
        final_metrics: last,
    };
    write_json(args.out.join("manifest.json"), &manifest)?;
    Ok(())
}
