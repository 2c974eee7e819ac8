use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use phynet_dump::{DatasetWriter, Precision};
use phynet_gendat::{generate_dataset, GenConfig};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML generation config (num_qubits, instances, field ranges, seed).
    #[arg(long)]
    pub config: PathBuf,
    /// Binary dataset file to create.
    #[arg(long)]
    pub out: PathBuf,
    /// Overrides the seed from the configuration.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write 4-byte elements instead of 8-byte ones.
    #[arg(long)]
    pub single: bool,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = GenConfig::from_yaml(&fs::read_to_string(&args.config)?)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let dataset = generate_dataset(&config)?;
    let precision = if args.single {
        Precision::Single
    } else {
        Precision::Double
    };
    DatasetWriter::new(precision).write(&dataset, &args.out)?;
    tracing::info!(
        num_qubits = config.num_qubits,
        instances = dataset.len(),
        seed = config.seed,
        out = %args.out.display(),
        "dataset generated"
    );
    Ok(())
}
