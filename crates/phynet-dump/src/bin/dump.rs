use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use phynet_dump::{print, write_csv, Precision, Reader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PrecisionArg {
    Single,
    Double,
}

impl From<PrecisionArg> for Precision {
    fn from(value: PrecisionArg) -> Self {
        match value {
            PrecisionArg::Single => Precision::Single,
            PrecisionArg::Double => Precision::Double,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dump", about = "Print a binary spin-chain dataset and optionally export CSV")]
struct Cli {
    /// Number of qubits per instance.
    num_qubits: usize,
    /// Dataset file to read.
    fpath: PathBuf,
    /// Any value (conventionally `-csv`) also writes input.csv and output.csv.
    #[arg(allow_hyphen_values = true, value_name = "-csv")]
    export: Option<String>,
    /// Element width of the dataset file.
    #[arg(long, value_enum, default_value = "double")]
    precision: PrecisionArg,
    /// Directory receiving the CSV exports.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn usage() -> ! {
    let program = std::env::args().next().unwrap_or_else(|| "dump".to_string());
    println!(" Usage: {program} <num_qubits>  <fpath> [-csv]");
    process::exit(-1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => usage(),
        Err(err) => err.exit(),
    };

    let reader = Reader::new(cli.num_qubits, &cli.fpath).with_precision(cli.precision.into());
    let dataset = match reader.read() {
        Ok(dataset) => dataset,
        Err(err) => {
            eprintln!("ERROR: {err}");
            process::exit(-1);
        }
    };

    if let Err(err) = print(&dataset) {
        eprintln!("ERROR: {err}");
        process::exit(-1);
    }

    if cli.export.is_some() {
        let input = cli.out_dir.join("input.csv");
        let output = cli.out_dir.join("output.csv");
        if let Err(err) = write_csv(&dataset, &input, &output) {
            eprintln!("ERROR: {err}");
            process::exit(-1);
        }
        println!(
            "Fields written to {}, wavefx's to {}",
            input.display(),
            output.display()
        );
    }
}
