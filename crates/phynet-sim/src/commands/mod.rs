pub mod evaluate;
pub mod generate;
pub mod train;

use std::error::Error;
use std::path::Path;

use phynet_core::{Dataset, RngHandle};
use phynet_dump::Reader;
use phynet_model::Model;
use phynet_nn::{AnyOptimizer, Mlp, StateLoss};

use crate::config::RunConfig;

pub type SurrogateModel = Model<Mlp, StateLoss, AnyOptimizer>;

/// Builds the ensemble described by `config`, reset to its seeded state.
pub fn build_model(config: &RunConfig) -> Result<SurrogateModel, Box<dyn Error>> {
    let n = config.num_qubits;
    let mut rng = RngHandle::from_seed(config.model.seed);
    let networks = (0..config.ensemble_size)
        .map(|_| Mlp::new(3 * n, 1usize << n, &config.network, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    let mut model = Model::new(
        networks,
        config.loss.build(),
        config.optimizer.build(),
        config.model.clone(),
    )?;
    model.reset();
    Ok(model)
}

pub fn read_dataset(config: &RunConfig, path: &Path) -> Result<Dataset, Box<dyn Error>> {
    let dataset = Reader::new(config.num_qubits, path)
        .with_precision(config.precision)
        .read()?;
    tracing::info!(path = %path.display(), instances = dataset.len(), "dataset loaded");
    Ok(dataset)
}
