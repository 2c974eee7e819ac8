use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Args;

use super::{build_model, read_dataset};
use crate::config::RunConfig;
use crate::write_json;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// YAML run configuration the checkpoint was trained with.
    #[arg(long)]
    pub config: PathBuf,
    /// Ensemble checkpoint written by `train`.
    #[arg(long)]
    pub checkpoint: PathBuf,
    /// Dataset to evaluate on.
    #[arg(long)]
    pub data: PathBuf,
    /// Output directory for the metric tables.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &EvaluateArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    fs::create_dir_all(&args.out)?;
    let dataset = read_dataset(&config, &args.data)?;
    let mut model = build_model(&config)?;
    model.load_parameters(&args.checkpoint)?;

    let outputs = &config.outputs;
    model.write_overlap(&dataset, 0, &args.out.join(&outputs.overlap))?;
    model.write_entanglement_entropy(&dataset, 0, &args.out.join(&outputs.entropy))?;
    model.write_magnetization(&dataset, 0, &args.out.join(&outputs.magnetization))?;
    model.write_lyapunov_estimate(&dataset, 0, &args.out.join(&outputs.lyapunov))?;
    model.write_radial_visualization(&dataset, 0, &args.out.join(&outputs.radviz))?;

    let bundle = model.metric_bundle(&dataset)?;
    write_json(args.out.join("evaluation.json"), &bundle)?;

    let mut stdout = io::stdout().lock();
    model.print_average_overlap(&dataset, &mut stdout)?;
    model.print_average_sz_error(&dataset, &mut stdout)?;
    model.print_inference_time(&dataset, &mut stdout)?;
    Ok(())
}
