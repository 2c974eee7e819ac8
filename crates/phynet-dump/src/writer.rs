use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use phynet_core::{Dataset, Instance, PhyError};

use crate::reader::{record_elements, Precision};

/// Produces files in the layout consumed by [`crate::Reader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetWriter {
    precision: Precision,
}

impl DatasetWriter {
    /// Creates a writer emitting elements of the given width.
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }

    /// Encodes one instance as a single record.
    pub fn encode_instance(&self, instance: &Instance<'_>) -> Vec<u8> {
        let n = instance.fields.num_qubits();
        let mut bytes = Vec::with_capacity(record_elements(n).unwrap_or_default() * self.precision.width());
        let fields = instance.fields;
        for &value in fields
            .coupling
            .iter()
            .chain(fields.transverse.iter())
            .chain(fields.longitudinal.iter())
            .chain(instance.values.iter())
            .chain(instance.wavefx.as_slice().iter())
        {
            self.precision.encode(value, &mut bytes);
        }
        bytes
    }

    /// Writes every instance of `dataset` to `path`, replacing existing content.
    pub fn write(&self, dataset: &Dataset, path: &Path) -> Result<(), PhyError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| PhyError::io("dataset-mkdir", parent, err))?;
        }
        let file = File::create(path).map_err(|err| PhyError::io("dataset-create", path, err))?;
        let mut out = BufWriter::new(file);
        for instance in dataset.iter() {
            out.write_all(&self.encode_instance(&instance))
                .map_err(|err| PhyError::io("dataset-write", path, err))?;
        }
        out.flush()
            .map_err(|err| PhyError::io("dataset-write", path, err))?;
        tracing::debug!(path = %path.display(), instances = dataset.len(), "wrote dataset");
        Ok(())
    }
}
